//! Message scopes: the routing fields carried on a message's own tag.
//!
//! A message's payload lives in child elements, but *where* it belongs
//! (which command it answers, which game, which player, which chat
//! channel) travels as attributes of the message element itself:
//!
//! ```text
//! <game_event type="roll_die" game_id="4" player_id="2">
//!   <sides>6</sides><value>3</value>
//! </game_event>
//! ```
//!
//! Each scope also fixes the element name, so the scope type alone
//! decides whether a message is a `command`, a `game_event`, and so on.

use cardtable_item::MapItem;

pub const CMD_ID_ATTRIBUTE: &str = "cmd_id";
pub const GAME_ID_ATTRIBUTE: &str = "game_id";
pub const PLAYER_ID_ATTRIBUTE: &str = "player_id";
pub const CHANNEL_ATTRIBUTE: &str = "channel";

/// Routing fields of one family of messages.
pub trait Scope: Default + Clone + PartialEq + Eq + std::fmt::Debug {
    /// Element name shared by every message with this scope.
    const ITEM_TYPE: &'static str;

    /// Reads the scope from a parsed element's attributes. Missing or
    /// malformed attributes fall back to the same sentinels leaves use.
    fn from_attributes(map: &MapItem) -> Self;

    fn write_attributes(&self, map: &mut MapItem);

    /// The command id this scope carries, if it is a command scope.
    fn cmd_id(&self) -> Option<i32> {
        None
    }
}

fn int_attribute(map: &MapItem, name: &str) -> i32 {
    map.attribute(name)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(-1)
}

fn string_attribute(map: &MapItem, name: &str) -> String {
    map.attribute(name).unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A command not tied to any game or channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandScope {
    /// Client-chosen id echoed back in the matching response.
    pub cmd_id: i32,
}

impl CommandScope {
    pub fn new(cmd_id: i32) -> Self {
        Self { cmd_id }
    }
}

impl Default for CommandScope {
    fn default() -> Self {
        Self { cmd_id: -1 }
    }
}

impl Scope for CommandScope {
    const ITEM_TYPE: &'static str = "command";

    fn from_attributes(map: &MapItem) -> Self {
        Self {
            cmd_id: int_attribute(map, CMD_ID_ATTRIBUTE),
        }
    }

    fn write_attributes(&self, map: &mut MapItem) {
        map.set_attribute(CMD_ID_ATTRIBUTE, self.cmd_id.to_string());
    }

    fn cmd_id(&self) -> Option<i32> {
        Some(self.cmd_id)
    }
}

/// A command acting on one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCommandScope {
    pub cmd_id: i32,
    pub game_id: i32,
}

impl GameCommandScope {
    pub fn new(cmd_id: i32, game_id: i32) -> Self {
        Self { cmd_id, game_id }
    }
}

impl Default for GameCommandScope {
    fn default() -> Self {
        Self {
            cmd_id: -1,
            game_id: -1,
        }
    }
}

impl Scope for GameCommandScope {
    const ITEM_TYPE: &'static str = "command";

    fn from_attributes(map: &MapItem) -> Self {
        Self {
            cmd_id: int_attribute(map, CMD_ID_ATTRIBUTE),
            game_id: int_attribute(map, GAME_ID_ATTRIBUTE),
        }
    }

    fn write_attributes(&self, map: &mut MapItem) {
        map.set_attribute(CMD_ID_ATTRIBUTE, self.cmd_id.to_string());
        map.set_attribute(GAME_ID_ATTRIBUTE, self.game_id.to_string());
    }

    fn cmd_id(&self) -> Option<i32> {
        Some(self.cmd_id)
    }
}

/// A command acting on one chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCommandScope {
    pub cmd_id: i32,
    pub channel: String,
}

impl ChatCommandScope {
    pub fn new(cmd_id: i32, channel: impl Into<String>) -> Self {
        Self {
            cmd_id,
            channel: channel.into(),
        }
    }
}

impl Default for ChatCommandScope {
    fn default() -> Self {
        Self {
            cmd_id: -1,
            channel: String::new(),
        }
    }
}

impl Scope for ChatCommandScope {
    const ITEM_TYPE: &'static str = "command";

    fn from_attributes(map: &MapItem) -> Self {
        Self {
            cmd_id: int_attribute(map, CMD_ID_ATTRIBUTE),
            channel: string_attribute(map, CHANNEL_ATTRIBUTE),
        }
    }

    fn write_attributes(&self, map: &mut MapItem) {
        map.set_attribute(CMD_ID_ATTRIBUTE, self.cmd_id.to_string());
        map.set_attribute(CHANNEL_ATTRIBUTE, self.channel.as_str());
    }

    fn cmd_id(&self) -> Option<i32> {
        Some(self.cmd_id)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Server-wide events with no routing fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventScope;

impl Scope for EventScope {
    const ITEM_TYPE: &'static str = "generic_event";

    fn from_attributes(_map: &MapItem) -> Self {
        Self
    }

    fn write_attributes(&self, _map: &mut MapItem) {}
}

/// Something a player did (or had happen to them) in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEventScope {
    pub game_id: i32,
    pub player_id: i32,
}

impl GameEventScope {
    pub fn new(game_id: i32, player_id: i32) -> Self {
        Self { game_id, player_id }
    }
}

impl Default for GameEventScope {
    fn default() -> Self {
        Self {
            game_id: -1,
            player_id: -1,
        }
    }
}

impl Scope for GameEventScope {
    const ITEM_TYPE: &'static str = "game_event";

    fn from_attributes(map: &MapItem) -> Self {
        Self {
            game_id: int_attribute(map, GAME_ID_ATTRIBUTE),
            player_id: int_attribute(map, PLAYER_ID_ATTRIBUTE),
        }
    }

    fn write_attributes(&self, map: &mut MapItem) {
        map.set_attribute(GAME_ID_ATTRIBUTE, self.game_id.to_string());
        map.set_attribute(PLAYER_ID_ATTRIBUTE, self.player_id.to_string());
    }
}

/// Activity in a chat channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatEventScope {
    pub channel: String,
}

impl ChatEventScope {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }
}

impl Scope for ChatEventScope {
    const ITEM_TYPE: &'static str = "chat_event";

    fn from_attributes(map: &MapItem) -> Self {
        Self {
            channel: string_attribute(map, CHANNEL_ATTRIBUTE),
        }
    }

    fn write_attributes(&self, map: &mut MapItem) {
        map.set_attribute(CHANNEL_ATTRIBUTE, self.channel.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_command_scope_round_trip() {
        let mut map = MapItem::new("command", "say");
        GameCommandScope::new(3, 9).write_attributes(&mut map);
        assert_eq!(map.attribute("cmd_id"), Some("3"));
        assert_eq!(map.attribute("game_id"), Some("9"));
        assert_eq!(
            GameCommandScope::from_attributes(&map),
            GameCommandScope::new(3, 9)
        );
    }

    #[test]
    fn test_missing_or_bad_attributes_become_sentinels() {
        let mut map = MapItem::new("game_event", "shuffle");
        map.set_attribute("game_id", "four");
        let scope = GameEventScope::from_attributes(&map);
        assert_eq!(scope, GameEventScope::default());
        assert_eq!(scope.game_id, -1);
        assert_eq!(scope.player_id, -1);
    }

    #[test]
    fn test_only_command_scopes_carry_cmd_id() {
        assert_eq!(ChatCommandScope::new(5, "lobby").cmd_id(), Some(5));
        assert_eq!(ChatEventScope::new("lobby").cmd_id(), None);
        assert_eq!(EventScope.cmd_id(), None);
    }
}
