//! Commands: client → server requests.
//!
//! Every command is a `<command>` element told apart by its `type`
//! attribute and carries a `cmd_id` the server echoes in its
//! [`Response`](crate::Response). Game commands add a `game_id`, chat
//! commands a `channel`.

use cardtable_item::Color;

use crate::message::message_enum;
use crate::scope::{ChatCommandScope, CommandScope, GameCommandScope};

// ---------------------------------------------------------------------------
// Session and lobby
// ---------------------------------------------------------------------------

crate::message! {
    /// Keep-alive; answered with an `ok` response.
    Ping: CommandScope, "ping" {}
}

crate::message! {
    Login: CommandScope, "login" {
        username: String = "username",
        password: String = "password",
    }
}

crate::message! {
    ChatListChannels: CommandScope, "chat_list_channels" {}
}

crate::message! {
    /// Joining names the channel in the body: the caller isn't in it yet.
    ChatJoinChannel: CommandScope, "chat_join_channel" {
        channel: String = "channel",
    }
}

crate::message! {
    ChatLeaveChannel: ChatCommandScope, "chat_leave_channel" {}
}

crate::message! {
    ChatSay: ChatCommandScope, "chat_say" {
        message: String = "message",
    }
}

crate::message! {
    ListGames: CommandScope, "list_games" {}
}

crate::message! {
    CreateGame: CommandScope, "create_game" {
        description: String = "description",
        password: String = "password",
        max_players: i32 = "max_players",
        spectators_allowed: bool = "spectators_allowed",
    }
}

crate::message! {
    JoinGame: CommandScope, "join_game" {
        game_id: i32 = "game_id",
        password: String = "password",
        spectator: bool = "spectator",
    }
}

// ---------------------------------------------------------------------------
// In-game
// ---------------------------------------------------------------------------

crate::message! {
    LeaveGame: GameCommandScope, "leave_game" {}
}

crate::message! {
    Say: GameCommandScope, "say" {
        message: String = "message",
    }
}

crate::message! {
    Shuffle: GameCommandScope, "shuffle" {}
}

crate::message! {
    RollDie: GameCommandScope, "roll_die" {
        sides: i32 = "sides",
    }
}

crate::message! {
    DrawCards: GameCommandScope, "draw_cards" {
        number: i32 = "number",
    }
}

crate::message! {
    /// Moves a card between zones, or within one.
    MoveCard: GameCommandScope, "move_card" {
        start_zone: String = "start_zone",
        card_id: i32 = "card_id",
        target_zone: String = "target_zone",
        x: i32 = "x",
        y: i32 = "y",
        face_down: bool = "face_down",
    }
}

crate::message! {
    CreateToken: GameCommandScope, "create_token" {
        zone: String = "zone",
        name: String = "name",
        /// Power/toughness text.
        pt: String = "pt",
        x: i32 = "x",
        y: i32 = "y",
    }
}

crate::message! {
    CreateArrow: GameCommandScope, "create_arrow" {
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
    DeleteArrow: GameCommandScope, "delete_arrow" {
        arrow_id: i32 = "arrow_id",
    }
}

crate::message! {
    SetCardAttr: GameCommandScope, "set_card_attr" {
        zone: String = "zone",
        card_id: i32 = "card_id",
        attr_name: String = "attr_name",
        attr_value: String = "attr_value",
    }
}

crate::message! {
    ReadyStart: GameCommandScope, "ready_start" {}
}

crate::message! {
    IncCounter: GameCommandScope, "inc_counter" {
        counter_id: i32 = "counter_id",
        delta: i32 = "delta",
    }
}

crate::message! {
    AddCounter: GameCommandScope, "add_counter" {
        counter_name: String = "counter_name",
        color: Color = "color",
        radius: i32 = "radius",
        value: i32 = "value",
    }
}

crate::message! {
    SetCounter: GameCommandScope, "set_counter" {
        counter_id: i32 = "counter_id",
        value: i32 = "value",
    }
}

crate::message! {
    DelCounter: GameCommandScope, "del_counter" {
        counter_id: i32 = "counter_id",
    }
}

crate::message! {
    NextTurn: GameCommandScope, "next_turn" {}
}

crate::message! {
    SetActivePhase: GameCommandScope, "set_active_phase" {
        phase: i32 = "phase",
    }
}

crate::message! {
    /// Asks to see the top `number_cards` of a zone (all of it when
    /// `-1`).
    DumpZone: GameCommandScope, "dump_zone" {
        player_id: i32 = "player_id",
        zone_name: String = "zone_name",
        number_cards: i32 = "number_cards",
    }
}

crate::message! {
    StopDumpZone: GameCommandScope, "stop_dump_zone" {
        player_id: i32 = "player_id",
        zone_name: String = "zone_name",
    }
}

crate::message! {
    DumpAll: GameCommandScope, "dump_all" {}
}

crate::message! {
    SubmitDeck: GameCommandScope, "submit_deck" {
        /// The deck list, compressed on the wire.
        deck: Vec<u8> = "deck",
    }
}

message_enum! {
    /// Every command this build understands.
    Command {
        Ping,
        Login,
        ChatListChannels,
        ChatJoinChannel,
        ChatLeaveChannel,
        ChatSay,
        ListGames,
        CreateGame,
        JoinGame,
        LeaveGame,
        Say,
        Shuffle,
        RollDie,
        DrawCards,
        MoveCard,
        CreateToken,
        CreateArrow,
        DeleteArrow,
        SetCardAttr,
        ReadyStart,
        IncCounter,
        AddCounter,
        SetCounter,
        DelCounter,
        NextTurn,
        SetActivePhase,
        DumpZone,
        StopDumpZone,
        DumpAll,
        SubmitDeck,
    }
}
