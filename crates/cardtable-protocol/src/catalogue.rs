//! The full protocol: registration of every item type, and typed dispatch
//! of decoded top-level items.

use std::sync::LazyLock;

use cardtable_item::{Item, Registry, RegistryBuilder};

use crate::{ChannelInfo, Command, Event, GameInfo, ProtocolError, Response};

/// Anything that travels as a top-level item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolItem {
    Command(Command),
    Event(Event),
    Response(Response),
}

impl ProtocolItem {
    /// Types a decoded top-level item.
    ///
    /// # Errors
    /// [`ProtocolError::Unrecognized`] for leaves, invalid placeholders,
    /// and maps no message type claims.
    pub fn from_item(item: &Item) -> Result<Self, ProtocolError> {
        let unrecognized = || ProtocolError::Unrecognized {
            item_type: item.item_type().to_string(),
            sub_type: item.sub_type().to_string(),
        };
        let map = item.as_map().ok_or_else(unrecognized)?;

        if let Some(command) = Command::from_map(map) {
            return Ok(Self::Command(command));
        }
        if let Some(event) = Event::from_map(map) {
            return Ok(Self::Event(event));
        }
        if Response::matches(map) {
            return Ok(Self::Response(Response::from_map(map)));
        }
        Err(unrecognized())
    }

    pub fn to_item(&self) -> Item {
        match self {
            Self::Command(command) => command.to_item(),
            Self::Event(event) => event.to_item(),
            Self::Response(response) => response.to_item(),
        }
    }
}

impl From<Command> for ProtocolItem {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

impl From<Event> for ProtocolItem {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

impl From<Response> for ProtocolItem {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

/// Registers every protocol item type with `builder`.
///
/// Applications that add their own messages call this first, then
/// register theirs, then build.
pub fn register_protocol(builder: &mut RegistryBuilder) {
    Command::register(builder);
    Event::register(builder);
    builder.register(Response::ITEM_TYPE, "", Response::blank_item);
    builder.register(GameInfo::ITEM_TYPE, "", GameInfo::blank_item);
    builder.register(ChannelInfo::ITEM_TYPE, "", ChannelInfo::blank_item);
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let mut builder = Registry::builder();
    register_protocol(&mut builder);
    builder.build()
});

/// The process-wide registry of protocol items, built on first use.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{command, event, GameCommandScope, GameEventScope, Message};
    use cardtable_item::MapItem;

    #[test]
    fn test_registry_has_no_key_collisions() {
        // 30 commands, 27 events, response, game, chat_channel.
        assert_eq!(registry().len(), 30 + 27 + 3);
    }

    #[test]
    fn test_registry_builds_blank_messages() {
        let item = registry().create("game_event", "move_card").unwrap();
        let map = item.as_map().unwrap();
        assert_eq!(map.named_children().len(), event::MoveCard::FIELDS.len());
        assert!(map.is_empty());
    }

    #[test]
    fn test_from_item_dispatches_each_family() {
        let command = command::Shuffle {
            scope: GameCommandScope::new(1, 2),
        };
        let event = event::Shuffle {
            scope: GameEventScope::new(2, 3),
        };
        let response = Response::ok(1);

        assert_eq!(
            ProtocolItem::from_item(&command.to_item()),
            Ok(ProtocolItem::Command(command.into()))
        );
        assert_eq!(
            ProtocolItem::from_item(&event.to_item()),
            Ok(ProtocolItem::Event(event.into()))
        );
        assert_eq!(
            ProtocolItem::from_item(&response.to_item()),
            Ok(ProtocolItem::Response(response))
        );
    }

    #[test]
    fn test_unknown_map_is_unrecognized() {
        let item: Item = MapItem::new("command", "teleport").into();
        assert_eq!(
            ProtocolItem::from_item(&item),
            Err(ProtocolError::Unrecognized {
                item_type: "command".into(),
                sub_type: "teleport".into(),
            })
        );
    }

    #[test]
    fn test_invalid_placeholder_is_unrecognized() {
        let item: Item = cardtable_item::InvalidItem::new("emote").into();
        assert!(matches!(
            ProtocolItem::from_item(&item),
            Err(ProtocolError::Unrecognized { item_type, .. }) if item_type == "emote"
        ));
    }
}
