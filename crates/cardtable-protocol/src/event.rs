//! Events: server → client notifications.
//!
//! Three families, one element name each:
//!
//! | element | scope | what |
//! |---|---|---|
//! | `game_event` | [`GameEventScope`] | a change to one game's state |
//! | `chat_event` | [`ChatEventScope`] | activity in a chat channel |
//! | `generic_event` | [`EventScope`] | lobby listings and server notices |

use cardtable_item::{Color, Field, MapItem};
use chrono::{DateTime, Utc};

use crate::info::{ChannelInfo, GameInfo};
use crate::message::message_enum;
use crate::scope::{ChatEventScope, EventScope, GameEventScope};
use crate::Message;

// ---------------------------------------------------------------------------
// Game events
// ---------------------------------------------------------------------------

crate::message! {
    Say: GameEventScope, "say" {
        message: String = "message",
    }
}

crate::message! {
    Join: GameEventScope, "join" {
        player_name: String = "player_name",
        spectator: bool = "spectator",
    }
}

crate::message! {
    Leave: GameEventScope, "leave" {}
}

crate::message! {
    GameClosed: GameEventScope, "game_closed" {}
}

crate::message! {
    ReadyStart: GameEventScope, "ready_start" {}
}

crate::message! {
    SetupZones: GameEventScope, "setup_zones" {
        deck_size: i32 = "deck_size",
        /// Sideboard size.
        sb_size: i32 = "sb_size",
    }
}

crate::message! {
    GameStart: GameEventScope, "game_start" {}
}

crate::message! {
    Shuffle: GameEventScope, "shuffle" {}
}

crate::message! {
    RollDie: GameEventScope, "roll_die" {
        sides: i32 = "sides",
        value: i32 = "value",
    }
}

crate::message! {
    /// A card changed zones. `card_name` and `position` stay blank when
    /// the card is hidden from the recipient.
    MoveCard: GameEventScope, "move_card" {
        card_id: i32 = "card_id",
        card_name: String = "card_name",
        start_zone: String = "start_zone",
        position: i32 = "position",
        target_zone: String = "target_zone",
        x: i32 = "x",
        y: i32 = "y",
        face_down: bool = "face_down",
    }
}

crate::message! {
    CreateToken: GameEventScope, "create_token" {
        zone: String = "zone",
        card_id: i32 = "card_id",
        card_name: String = "card_name",
        pt: String = "pt",
        x: i32 = "x",
        y: i32 = "y",
    }
}

crate::message! {
    CreateArrow: GameEventScope, "create_arrow" {
        arrow_id: i32 = "arrow_id",
        start_player_id: i32 = "start_player_id",
        start_zone: String = "start_zone",
        start_card_id: i32 = "start_card_id",
        target_player_id: i32 = "target_player_id",
        target_zone: String = "target_zone",
        target_card_id: i32 = "target_card_id",
        color: Color = "color",
    }
}

crate::message! {
    DeleteArrow: GameEventScope, "delete_arrow" {
        arrow_id: i32 = "arrow_id",
    }
}

crate::message! {
    SetCardAttr: GameEventScope, "set_card_attr" {
        zone: String = "zone",
        card_id: i32 = "card_id",
        attr_name: String = "attr_name",
        attr_value: String = "attr_value",
    }
}

crate::message! {
    AddCounter: GameEventScope, "add_counter" {
        counter_id: i32 = "counter_id",
        counter_name: String = "counter_name",
        color: Color = "color",
        radius: i32 = "radius",
        value: i32 = "value",
    }
}

crate::message! {
    SetCounter: GameEventScope, "set_counter" {
        counter_id: i32 = "counter_id",
        value: i32 = "value",
    }
}

crate::message! {
    DelCounter: GameEventScope, "del_counter" {
        counter_id: i32 = "counter_id",
    }
}

crate::message! {
    SetActivePlayer: GameEventScope, "set_active_player" {
        active_player_id: i32 = "active_player_id",
    }
}

crate::message! {
    SetActivePhase: GameEventScope, "set_active_phase" {
        phase: i32 = "phase",
    }
}

crate::message! {
    DumpZone: GameEventScope, "dump_zone" {
        zone_owner_id: i32 = "zone_owner_id",
        zone: String = "zone",
        number_cards: i32 = "number_cards",
    }
}

crate::message! {
    StopDumpZone: GameEventScope, "stop_dump_zone" {
        zone_owner_id: i32 = "zone_owner_id",
        zone: String = "zone",
    }
}

// ---------------------------------------------------------------------------
// Chat events
// ---------------------------------------------------------------------------

crate::message! {
    ChatJoinChannel: ChatEventScope, "join_channel" {
        player_name: String = "player_name",
    }
}

crate::message! {
    ChatLeaveChannel: ChatEventScope, "leave_channel" {
        player_name: String = "player_name",
    }
}

crate::message! {
    ChatSay: ChatEventScope, "say" {
        player_name: String = "player_name",
        message: String = "message",
    }
}

// ---------------------------------------------------------------------------
// Generic events
// ---------------------------------------------------------------------------

crate::message! {
    /// A notice from the server operator.
    ServerMessage: EventScope, "server_message" {
        message: String = "message",
        sent_at: Option<DateTime<Utc>> = "sent_at",
    }
}

/// The lobby's game list. Entries travel as repeated `<game>` children.
///
/// An entry with every field at its blank value (such as
/// `GameInfo::default()`) writes nothing and is not seen by the receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListGames {
    pub scope: EventScope,
    pub games: Vec<GameInfo>,
}

impl Message for ListGames {
    type Scope = EventScope;
    const SUB_TYPE: &'static str = "list_games";
    const FIELDS: &'static [Field] = &[];

    fn scope(&self) -> &EventScope {
        &self.scope
    }

    fn extract(scope: EventScope, map: &MapItem) -> Self {
        Self {
            scope,
            games: map
                .repeated_maps(GameInfo::ITEM_TYPE, "")
                .map(GameInfo::from_map)
                .collect(),
        }
    }

    fn fill(&self, map: &mut MapItem) {
        for game in &self.games {
            map.push_repeated(game.to_map());
        }
    }
}

/// The chat channel list. Entries travel as repeated `<chat_channel>`
/// children. As with [`ListGames`], an all-blank entry is dropped on the
/// wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListChatChannels {
    pub scope: EventScope,
    pub channels: Vec<ChannelInfo>,
}

impl Message for ListChatChannels {
    type Scope = EventScope;
    const SUB_TYPE: &'static str = "list_chat_channels";
    const FIELDS: &'static [Field] = &[];

    fn scope(&self) -> &EventScope {
        &self.scope
    }

    fn extract(scope: EventScope, map: &MapItem) -> Self {
        Self {
            scope,
            channels: map
                .repeated_maps(ChannelInfo::ITEM_TYPE, "")
                .map(ChannelInfo::from_map)
                .collect(),
        }
    }

    fn fill(&self, map: &mut MapItem) {
        for channel in &self.channels {
            map.push_repeated(channel.to_map());
        }
    }
}

message_enum! {
    /// Every event this build understands.
    Event {
        Say,
        Join,
        Leave,
        GameClosed,
        ReadyStart,
        SetupZones,
        GameStart,
        Shuffle,
        RollDie,
        MoveCard,
        CreateToken,
        CreateArrow,
        DeleteArrow,
        SetCardAttr,
        AddCounter,
        SetCounter,
        DelCounter,
        SetActivePlayer,
        SetActivePhase,
        DumpZone,
        StopDumpZone,
        ChatJoinChannel,
        ChatLeaveChannel,
        ChatSay,
        ListGames,
        ListChatChannels,
        ServerMessage,
    }
}
