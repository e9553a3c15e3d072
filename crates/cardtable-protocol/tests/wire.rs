//! Protocol messages through the full text codec.

use std::collections::HashSet;

use cardtable_item::Color;
use cardtable_protocol::{
    command, event, registry, ChannelInfo, ChatCommandScope, ChatEventScope, Command,
    CommandScope, Event, EventScope, GameCommandScope, GameEventScope, GameInfo, Message,
    ProtocolError, ProtocolItem, Response, ResponseCode,
};
use chrono::{DateTime, Utc};
use cardtable_stream::{Decoded, StreamConfig, StreamDecoder, StreamEncoder};

fn encode(items: &[ProtocolItem]) -> String {
    let mut encoder = StreamEncoder::new(StreamConfig::default());
    for item in items {
        encoder.encode(&item.to_item());
    }
    encoder.close();
    encoder.take_output()
}

fn decode(text: &str) -> Vec<Result<ProtocolItem, ProtocolError>> {
    let mut decoder = StreamDecoder::new(registry(), StreamConfig::default());
    decoder.push_str(text);
    let mut out = Vec::new();
    loop {
        match decoder.next_item().unwrap() {
            Decoded::Item(item) => out.push(ProtocolItem::from_item(&item)),
            Decoded::Pending => panic!("document ended early"),
            Decoded::Finished => return out,
        }
    }
}

#[test]
fn test_move_card_event_omits_unset_fields() {
    let moved = event::MoveCard {
        scope: GameEventScope::new(3, 1),
        card_id: 7,
        start_zone: "hand".into(),
        target_zone: "table".into(),
        x: 100,
        y: 200,
        face_down: false,
        ..event::MoveCard::default()
    };

    let text = encode(&[Event::from(moved.clone()).into()]);
    assert!(!text.contains("<position>"), "{text}");
    assert!(!text.contains("<card_name>"), "{text}");
    assert!(!text.contains("<face_down>"), "{text}");
    assert!(text.contains("<card_id>7</card_id>"), "{text}");

    let decoded = decode(&text);
    assert_eq!(decoded.len(), 1);
    let Ok(ProtocolItem::Event(Event::MoveCard(parsed))) = &decoded[0] else {
        panic!("expected a move_card event, got {:?}", decoded[0]);
    };
    assert_eq!(parsed.card_id, 7);
    assert_eq!(parsed.start_zone, "hand");
    assert_eq!(parsed.target_zone, "table");
    assert_eq!(parsed.x, 100);
    assert_eq!(parsed.y, 200);
    assert!(!parsed.face_down);
    assert_eq!(parsed.position, -1);
    assert_eq!(*parsed, moved);
}

#[test]
fn test_game_list_survives_the_wire() {
    let list = event::ListGames {
        scope: EventScope,
        games: vec![
            GameInfo {
                game_id: 1,
                description: "R&D <draft>".into(),
                max_players: 4,
                ..GameInfo::default()
            },
            GameInfo {
                game_id: 2,
                has_password: true,
                ..GameInfo::default()
            },
        ],
    };
    let decoded = decode(&encode(&[Event::from(list.clone()).into()]));
    assert_eq!(decoded, vec![Ok(ProtocolItem::Event(Event::ListGames(list)))]);
}

#[test]
fn test_newer_peer_items_are_skipped_not_fatal() {
    let text = concat!(
        r#"<cardtable_stream version="1">"#,
        r#"<game_event type="emote" game_id="1" player_id="2"><face>wink</face></game_event>"#,
        r#"<game_event type="roll_die" game_id="1" player_id="2">"#,
        r#"<sides>6</sides><dice_skin><texture>gold</texture></dice_skin><value>4</value>"#,
        r#"</game_event>"#,
        "</cardtable_stream>",
    );
    let decoded = decode(text);
    assert_eq!(decoded.len(), 2);
    assert!(matches!(
        &decoded[0],
        Err(ProtocolError::Unrecognized { sub_type, .. }) if sub_type == "emote"
    ));

    let Ok(ProtocolItem::Event(Event::RollDie(roll))) = &decoded[1] else {
        panic!("expected a roll_die event");
    };
    assert_eq!(roll.sides, 6);
    assert_eq!(roll.value, 4);
    assert_eq!(roll.scope, GameEventScope::new(1, 2));
}

#[test]
fn test_malformed_scalars_become_sentinels() {
    let text = concat!(
        r#"<cardtable_stream version="1">"#,
        r#"<game_event type="set_counter" game_id="x"><counter_id>twelve</counter_id><value>5</value></game_event>"#,
        "</cardtable_stream>",
    );
    let decoded = decode(text);
    let Ok(ProtocolItem::Event(Event::SetCounter(set))) = &decoded[0] else {
        panic!("expected a set_counter event");
    };
    assert_eq!(set.counter_id, -1);
    assert_eq!(set.value, 5);
    assert_eq!(set.scope.game_id, -1);
    assert_eq!(set.to_item().sub_type(), "set_counter");
}

#[test]
fn test_blank_list_entries_are_dropped() {
    let list = event::ListGames {
        scope: EventScope,
        games: vec![
            GameInfo::default(),
            GameInfo {
                game_id: 5,
                ..GameInfo::default()
            },
        ],
    };
    let decoded = decode(&encode(&[Event::from(list).into()]));
    let Ok(ProtocolItem::Event(Event::ListGames(parsed))) = &decoded[0] else {
        panic!("expected a list_games event, got {:?}", decoded[0]);
    };
    assert_eq!(parsed.games.len(), 1);
    assert_eq!(parsed.games[0].game_id, 5);
}

// =========================================================================
// Whole catalogue
// =========================================================================

/// Text that only survives if entities and the whitespace between them do.
const AWKWARD: &str = "a & & b";
const BRACKETS: &str = "< >";
const QUOTED: &str = r#"say "hi" it's <ok>"#;

fn game() -> GameCommandScope {
    GameCommandScope::new(11, 4)
}

fn commands() -> Vec<Command> {
    let red = Color::new(200, 10, 10);
    vec![
        command::Ping { scope: CommandScope::new(1) }.into(),
        command::Login {
            scope: CommandScope::new(2),
            username: AWKWARD.into(),
            password: BRACKETS.into(),
        }
        .into(),
        command::ChatListChannels { scope: CommandScope::new(3) }.into(),
        command::ChatJoinChannel {
            scope: CommandScope::new(4),
            channel: "lobby & co".into(),
        }
        .into(),
        command::ChatLeaveChannel { scope: ChatCommandScope::new(5, "lobby") }.into(),
        command::ChatSay {
            scope: ChatCommandScope::new(6, "r&d"),
            message: AWKWARD.into(),
        }
        .into(),
        command::ListGames { scope: CommandScope::new(7) }.into(),
        command::CreateGame {
            scope: CommandScope::new(8),
            description: QUOTED.into(),
            password: "pw".into(),
            max_players: 4,
            spectators_allowed: true,
        }
        .into(),
        command::JoinGame {
            scope: CommandScope::new(9),
            game_id: 4,
            password: BRACKETS.into(),
            spectator: true,
        }
        .into(),
        command::LeaveGame { scope: game() }.into(),
        command::Say { scope: game(), message: QUOTED.into() }.into(),
        command::Shuffle { scope: game() }.into(),
        command::RollDie { scope: game(), sides: 20 }.into(),
        command::DrawCards { scope: game(), number: 7 }.into(),
        command::MoveCard {
            scope: game(),
            start_zone: "hand".into(),
            card_id: 12,
            target_zone: "table".into(),
            x: 3,
            y: 0,
            face_down: true,
        }
        .into(),
        command::CreateToken {
            scope: game(),
            zone: "table".into(),
            name: "Goblin & Friend".into(),
            pt: "1/1".into(),
            x: 2,
            y: 5,
        }
        .into(),
        command::CreateArrow {
            scope: game(),
            start_player_id: 1,
            start_zone: "table".into(),
            start_card_id: 3,
            target_player_id: 2,
            target_zone: "table".into(),
            target_card_id: 8,
            color: red,
        }
        .into(),
        command::DeleteArrow { scope: game(), arrow_id: 6 }.into(),
        command::SetCardAttr {
            scope: game(),
            zone: "table".into(),
            card_id: 12,
            attr_name: "annotation".into(),
            attr_value: BRACKETS.into(),
        }
        .into(),
        command::ReadyStart { scope: game() }.into(),
        command::IncCounter { scope: game(), counter_id: 2, delta: -3 }.into(),
        command::AddCounter {
            scope: game(),
            counter_name: "life".into(),
            color: red,
            radius: 9,
            value: 20,
        }
        .into(),
        command::SetCounter { scope: game(), counter_id: 2, value: 0 }.into(),
        command::DelCounter { scope: game(), counter_id: 2 }.into(),
        command::NextTurn { scope: game() }.into(),
        command::SetActivePhase { scope: game(), phase: 3 }.into(),
        command::DumpZone {
            scope: game(),
            player_id: 2,
            zone_name: "deck".into(),
            number_cards: 5,
        }
        .into(),
        command::StopDumpZone {
            scope: game(),
            player_id: 2,
            zone_name: "deck".into(),
        }
        .into(),
        command::DumpAll { scope: game() }.into(),
        command::SubmitDeck {
            scope: game(),
            deck: b"4 Island\n4 Counterspell & more\n".to_vec(),
        }
        .into(),
    ]
}

fn events() -> Vec<Event> {
    let blue = Color::new(10, 10, 200);
    let at = GameEventScope::new(4, 2);
    vec![
        event::Say { scope: at.clone(), message: AWKWARD.into() }.into(),
        event::Join {
            scope: at.clone(),
            player_name: "ann & bo".into(),
            spectator: true,
        }
        .into(),
        event::Leave { scope: at.clone() }.into(),
        event::GameClosed { scope: at.clone() }.into(),
        event::ReadyStart { scope: at.clone() }.into(),
        event::SetupZones { scope: at.clone(), deck_size: 60, sb_size: 15 }.into(),
        event::GameStart { scope: at.clone() }.into(),
        event::Shuffle { scope: at.clone() }.into(),
        event::RollDie { scope: at.clone(), sides: 6, value: 4 }.into(),
        event::MoveCard {
            scope: at.clone(),
            card_id: 12,
            card_name: "Fire // Ice".into(),
            start_zone: "hand".into(),
            position: 0,
            target_zone: "table".into(),
            x: 1,
            y: 2,
            face_down: true,
        }
        .into(),
        event::CreateToken {
            scope: at.clone(),
            zone: "table".into(),
            card_id: 40,
            card_name: BRACKETS.into(),
            pt: "2/2".into(),
            x: 0,
            y: 1,
        }
        .into(),
        event::CreateArrow {
            scope: at.clone(),
            arrow_id: 6,
            start_player_id: 1,
            start_zone: "table".into(),
            start_card_id: 3,
            target_player_id: 2,
            target_zone: "table".into(),
            target_card_id: 8,
            color: blue,
        }
        .into(),
        event::DeleteArrow { scope: at.clone(), arrow_id: 6 }.into(),
        event::SetCardAttr {
            scope: at.clone(),
            zone: "table".into(),
            card_id: 12,
            attr_name: "tapped".into(),
            attr_value: "1".into(),
        }
        .into(),
        event::AddCounter {
            scope: at.clone(),
            counter_id: 2,
            counter_name: "poison".into(),
            color: blue,
            radius: 5,
            value: 1,
        }
        .into(),
        event::SetCounter { scope: at.clone(), counter_id: 2, value: 3 }.into(),
        event::DelCounter { scope: at.clone(), counter_id: 2 }.into(),
        event::SetActivePlayer { scope: at.clone(), active_player_id: 2 }.into(),
        event::SetActivePhase { scope: at.clone(), phase: 4 }.into(),
        event::DumpZone {
            scope: at.clone(),
            zone_owner_id: 1,
            zone: "grave".into(),
            number_cards: 3,
        }
        .into(),
        event::StopDumpZone {
            scope: at.clone(),
            zone_owner_id: 1,
            zone: "grave".into(),
        }
        .into(),
        event::ChatJoinChannel {
            scope: ChatEventScope::new("lobby"),
            player_name: "ann".into(),
        }
        .into(),
        event::ChatLeaveChannel {
            scope: ChatEventScope::new("lobby"),
            player_name: "bo".into(),
        }
        .into(),
        event::ChatSay {
            scope: ChatEventScope::new("r&d"),
            player_name: "ann".into(),
            message: QUOTED.into(),
        }
        .into(),
        event::ServerMessage {
            scope: EventScope,
            message: AWKWARD.into(),
            sent_at: DateTime::<Utc>::from_timestamp(1_300_000_000, 0),
        }
        .into(),
        event::ListGames {
            scope: EventScope,
            games: vec![GameInfo {
                game_id: 4,
                description: BRACKETS.into(),
                has_password: true,
                player_count: 2,
                max_players: 4,
                creator: "ann".into(),
                spectators_allowed: true,
                spectator_count: 1,
            }],
        }
        .into(),
        event::ListChatChannels {
            scope: EventScope,
            channels: vec![ChannelInfo {
                name: "lobby".into(),
                description: AWKWARD.into(),
                player_count: 9,
                auto_join: true,
            }],
        }
        .into(),
    ]
}

#[test]
fn test_every_command_survives_the_wire() {
    let commands = commands();
    assert_eq!(commands.len(), 30);
    let sub_types: HashSet<_> = commands.iter().map(Command::sub_type).collect();
    assert_eq!(sub_types.len(), commands.len(), "each command once");

    let items: Vec<ProtocolItem> = commands.iter().cloned().map(ProtocolItem::from).collect();
    let decoded = decode(&encode(&items));
    assert_eq!(decoded.len(), items.len());
    for (sent, received) in items.into_iter().zip(decoded) {
        assert_eq!(received, Ok(sent));
    }
}

#[test]
fn test_every_event_survives_the_wire() {
    let events = events();
    assert_eq!(events.len(), 27);

    let items: Vec<ProtocolItem> = events.iter().cloned().map(ProtocolItem::from).collect();
    let decoded = decode(&encode(&items));
    assert_eq!(decoded.len(), items.len());
    for (sent, received) in items.into_iter().zip(decoded) {
        assert_eq!(received, Ok(sent));
    }
}

#[test]
fn test_entity_text_survives_the_wire() {
    let say = command::ChatSay {
        scope: ChatCommandScope::new(1, "main"),
        message: AWKWARD.into(),
    };
    let text = encode(&[Command::from(say.clone()).into()]);
    assert!(text.contains("<message>a &amp; &amp; b</message>"), "{text}");
    assert_eq!(decode(&text), vec![Ok(ProtocolItem::Command(say.into()))]);

    let reply = Response::new(2, ResponseCode::Ok);
    let decoded = decode(&encode(&[reply.clone().into()]));
    assert_eq!(decoded, vec![Ok(ProtocolItem::Response(reply))]);
}
