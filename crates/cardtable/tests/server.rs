//! Integration tests for the Cardtable server, handler, and full connection flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cardtable::prelude::*;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

// =========================================================================
// Mock handler
// =========================================================================

/// Rolls a fixed value and counts disconnects.
#[derive(Default)]
struct FixedDice {
    disconnects: Arc<AtomicUsize>,
}

impl CommandHandler for FixedDice {
    fn handle(&self, _session: &mut Session, command: &Command) -> Reply {
        match command {
            Command::Login(login) if login.username.is_empty() => {
                Reply::with_code(ResponseCode::WrongPassword)
            }
            Command::Login(_) => Reply::ok(),
            Command::RollDie(roll) => Reply::ok().event(event::RollDie {
                scope: GameEventScope::new(roll.scope.game_id, 0),
                sides: roll.sides,
                value: roll.sides.min(4),
            }),
            _ => Reply::with_code(ResponseCode::InvalidCommand),
        }
    }

    fn disconnected(&self, _session_id: u64) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

// =========================================================================
// Helpers
// =========================================================================

/// Starts a server on a random port and returns the address.
async fn start_server(handler: FixedDice) -> String {
    let server = CardtableServer::<FixedDice>::builder()
        .bind("127.0.0.1:0")
        .build(handler)
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> TcpConnection {
    TcpConnection::connect(addr, StreamConfig::default())
        .await
        .expect("should connect")
}

async fn expect_response<R, W>(conn: &mut ProtocolConnection<R, W>) -> Response
where
    R: tokio::io::AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    match conn.recv().await.expect("recv") {
        Some(ProtocolItem::Response(response)) => response,
        other => panic!("expected Response, got {other:?}"),
    }
}

async fn login(conn: &mut TcpConnection, cmd_id: i32) {
    conn.send(Command::from(command::Login {
        scope: CommandScope::new(cmd_id),
        username: "alice".into(),
        password: String::new(),
    }))
    .await
    .expect("send login");
    assert_eq!(expect_response(conn).await, Response::ok(cmd_id));
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_ping_without_login() {
    let addr = start_server(FixedDice::default()).await;
    let mut conn = connect(&addr).await;

    conn.send(Command::from(command::Ping {
        scope: CommandScope::new(7),
    }))
    .await
    .expect("send ping");

    assert_eq!(expect_response(&mut conn).await, Response::ok(7));
}

#[tokio::test]
async fn test_login_required_for_game_commands() {
    let addr = start_server(FixedDice::default()).await;
    let mut conn = connect(&addr).await;

    conn.send(Command::from(command::RollDie {
        scope: GameCommandScope::new(1, 3),
        sides: 6,
    }))
    .await
    .expect("send roll");

    assert_eq!(
        expect_response(&mut conn).await,
        Response::new(1, ResponseCode::LoginNeeded)
    );
}

#[tokio::test]
async fn test_rejected_login_stays_logged_out() {
    let addr = start_server(FixedDice::default()).await;
    let mut conn = connect(&addr).await;

    conn.send(Command::from(command::Login {
        scope: CommandScope::new(1),
        ..command::Login::default()
    }))
    .await
    .expect("send login");
    assert_eq!(
        expect_response(&mut conn).await,
        Response::new(1, ResponseCode::WrongPassword)
    );

    conn.send(Command::from(command::Shuffle {
        scope: GameCommandScope::new(2, 3),
    }))
    .await
    .expect("send shuffle");
    assert_eq!(
        expect_response(&mut conn).await,
        Response::new(2, ResponseCode::LoginNeeded)
    );
}

#[tokio::test]
async fn test_events_arrive_before_response() {
    let addr = start_server(FixedDice::default()).await;
    let mut conn = connect(&addr).await;
    login(&mut conn, 1).await;

    conn.send(Command::from(command::RollDie {
        scope: GameCommandScope::new(2, 3),
        sides: 20,
    }))
    .await
    .expect("send roll");

    match conn.recv().await.expect("recv event") {
        Some(ProtocolItem::Event(Event::RollDie(roll))) => {
            assert_eq!(roll.scope.game_id, 3);
            assert_eq!(roll.sides, 20);
            assert_eq!(roll.value, 4);
        }
        other => panic!("expected RollDie event, got {other:?}"),
    }
    assert_eq!(expect_response(&mut conn).await, Response::ok(2));
}

#[tokio::test]
async fn test_unknown_command_is_skipped() {
    let addr = start_server(FixedDice::default()).await;
    let stream = TcpStream::connect(&addr).await.expect("should connect");
    let (read, mut write) = stream.into_split();

    write
        .write_all(
            br#"<cardtable_stream version="1"><command type="teleport" cmd_id="1"><target>moon</target></command><command type="ping" cmd_id="2"/>"#,
        )
        .await
        .expect("write raw");

    let mut conn = ProtocolConnection::new(read, write, StreamConfig::default());
    assert_eq!(expect_response(&mut conn).await, Response::ok(2));
}

#[tokio::test]
async fn test_version_mismatch_drops_connection() {
    let disconnects = Arc::new(AtomicUsize::new(0));
    let addr = start_server(FixedDice {
        disconnects: Arc::clone(&disconnects),
    })
    .await;
    let stream = TcpStream::connect(&addr).await.expect("should connect");
    let (read, mut write) = stream.into_split();

    write
        .write_all(br#"<cardtable_stream version="99"><command type="ping" cmd_id="1"/>"#)
        .await
        .expect("write raw");

    let mut conn = ProtocolConnection::new(read, write, StreamConfig::default());
    let next = tokio::time::timeout(Duration::from_secs(2), conn.recv())
        .await
        .expect("server should hang up");
    // A reset instead of a clean FIN is fine too; the ping is never answered.
    assert!(matches!(next, Ok(None) | Err(_)), "got {next:?}");

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_client_close_ends_session() {
    let disconnects = Arc::new(AtomicUsize::new(0));
    let addr = start_server(FixedDice {
        disconnects: Arc::clone(&disconnects),
    })
    .await;
    let mut conn = connect(&addr).await;
    login(&mut conn, 1).await;

    conn.close().await.expect("close");
    assert!(matches!(conn.recv().await, Ok(None)));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(disconnects.load(Ordering::SeqCst), 1);
}
