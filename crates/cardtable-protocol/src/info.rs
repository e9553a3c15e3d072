//! Listing entries nested inside server events.
//!
//! These are ordinary composites with no scope of their own. They show up
//! as repeated children of the list events, so they are registered under
//! their element names like any other discoverable item.

use cardtable_item::{Field, Item, LeafKind, MapItem};

/// One open game, as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub game_id: i32,
    pub description: String,
    pub has_password: bool,
    pub player_count: i32,
    pub max_players: i32,
    pub creator: String,
    pub spectators_allowed: bool,
    pub spectator_count: i32,
}

impl GameInfo {
    pub const ITEM_TYPE: &'static str = "game";

    pub const FIELDS: &'static [Field] = &[
        Field::leaf("game_id", LeafKind::Int),
        Field::leaf("description", LeafKind::String),
        Field::leaf("has_password", LeafKind::Bool),
        Field::leaf("player_count", LeafKind::Int),
        Field::leaf("max_players", LeafKind::Int),
        Field::leaf("creator", LeafKind::String),
        Field::leaf("spectators_allowed", LeafKind::Bool),
        Field::leaf("spectator_count", LeafKind::Int),
    ];

    pub fn blank_map() -> MapItem {
        MapItem::from_fields(Self::ITEM_TYPE, "", Self::FIELDS)
    }

    pub fn blank_item() -> Item {
        Self::blank_map().into()
    }

    pub fn to_map(&self) -> MapItem {
        let mut map = Self::blank_map();
        map.set_leaf("game_id", self.game_id);
        map.set_leaf("description", self.description.clone());
        map.set_leaf("has_password", self.has_password);
        map.set_leaf("player_count", self.player_count);
        map.set_leaf("max_players", self.max_players);
        map.set_leaf("creator", self.creator.clone());
        map.set_leaf("spectators_allowed", self.spectators_allowed);
        map.set_leaf("spectator_count", self.spectator_count);
        map
    }

    pub fn from_map(map: &MapItem) -> Self {
        Self {
            game_id: map.leaf_data("game_id"),
            description: map.leaf_data("description"),
            has_password: map.leaf_data("has_password"),
            player_count: map.leaf_data("player_count"),
            max_players: map.leaf_data("max_players"),
            creator: map.leaf_data("creator"),
            spectators_allowed: map.leaf_data("spectators_allowed"),
            spectator_count: map.leaf_data("spectator_count"),
        }
    }
}

impl Default for GameInfo {
    fn default() -> Self {
        Self::from_map(&Self::blank_map())
    }
}

/// One chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub name: String,
    pub description: String,
    pub player_count: i32,
    /// Clients join this channel right after logging in.
    pub auto_join: bool,
}

impl ChannelInfo {
    pub const ITEM_TYPE: &'static str = "chat_channel";

    pub const FIELDS: &'static [Field] = &[
        Field::leaf("name", LeafKind::String),
        Field::leaf("description", LeafKind::String),
        Field::leaf("player_count", LeafKind::Int),
        Field::leaf("auto_join", LeafKind::Bool),
    ];

    pub fn blank_map() -> MapItem {
        MapItem::from_fields(Self::ITEM_TYPE, "", Self::FIELDS)
    }

    pub fn blank_item() -> Item {
        Self::blank_map().into()
    }

    pub fn to_map(&self) -> MapItem {
        let mut map = Self::blank_map();
        map.set_leaf("name", self.name.clone());
        map.set_leaf("description", self.description.clone());
        map.set_leaf("player_count", self.player_count);
        map.set_leaf("auto_join", self.auto_join);
        map
    }

    pub fn from_map(map: &MapItem) -> Self {
        Self {
            name: map.leaf_data("name"),
            description: map.leaf_data("description"),
            player_count: map.leaf_data("player_count"),
            auto_join: map.leaf_data("auto_join"),
        }
    }
}

impl Default for ChannelInfo {
    fn default() -> Self {
        Self::from_map(&Self::blank_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_game_info_is_empty() {
        let info = GameInfo::default();
        assert_eq!(info.game_id, -1);
        assert!(info.to_map().is_empty());
    }

    #[test]
    fn test_game_info_map_round_trip() {
        let info = GameInfo {
            game_id: 4,
            description: "casual".into(),
            has_password: false,
            player_count: 1,
            max_players: 2,
            creator: "ann".into(),
            spectators_allowed: true,
            spectator_count: 0,
        };
        assert_eq!(GameInfo::from_map(&info.to_map()), info);
    }
}
