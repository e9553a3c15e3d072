//! Per-connection handling: the [`CommandHandler`] seam and the loop that
//! drives it.
//!
//! Each accepted socket gets its own tokio task running
//! [`handle_connection`]:
//!   1. Open our side of the stream.
//!   2. Loop: receive a command → answer `ping` and enforce login
//!      ourselves, hand everything else to the handler → send the
//!      handler's events, then the response.
//!   3. Close the stream when the peer does, or after the idle timeout.

use std::net::SocketAddr;
use std::sync::Arc;

use cardtable_protocol::{Command, Event, ProtocolItem, Response, ResponseCode};
use tokio::net::TcpStream;

use crate::server::ServerState;
use crate::{CardtableError, TcpConnection};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// What the server knows about one connected client.
#[derive(Debug, Clone)]
pub struct Session {
    id: u64,
    peer: SocketAddr,
    username: Option<String>,
}

impl Session {
    pub fn new(id: u64, peer: SocketAddr) -> Self {
        Self {
            id,
            peer,
            username: None,
        }
    }

    /// Server-assigned id, unique for the life of the process.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The name this client logged in with.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    /// Marks the session as logged in. The server does this itself when a
    /// `login` command is answered with `ok`.
    pub fn log_in(&mut self, username: String) {
        self.username = Some(username);
    }
}

// ---------------------------------------------------------------------------
// CommandHandler
// ---------------------------------------------------------------------------

/// The handler's answer to one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Sent back in the [`Response`] for the command.
    pub code: ResponseCode,
    /// Sent to the same client, before the response.
    pub events: Vec<Event>,
}

impl Reply {
    pub fn ok() -> Self {
        Self::with_code(ResponseCode::Ok)
    }

    pub fn with_code(code: ResponseCode) -> Self {
        Self {
            code,
            events: Vec::new(),
        }
    }

    /// Adds an event to send along with the response.
    pub fn event(mut self, event: impl Into<Event>) -> Self {
        self.events.push(event.into());
        self
    }
}

/// Application logic behind the server.
///
/// `ping` never reaches the handler. Until a client's `login` succeeds,
/// other commands are answered with `login_needed` (unless the server is
/// configured otherwise).
pub trait CommandHandler: Send + Sync + 'static {
    /// Handles one command.
    ///
    /// Returning `ok` for a [`Command::Login`] marks the session as
    /// logged in under the requested username.
    fn handle(&self, session: &mut Session, command: &Command) -> Reply;

    /// Called once when a client's connection ends, however it ends.
    fn disconnected(&self, _session_id: u64) {}
}

/// Calls [`CommandHandler::disconnected`] when the connection task ends,
/// including on early returns.
struct DisconnectGuard<H: CommandHandler> {
    session_id: u64,
    state: Arc<ServerState<H>>,
}

impl<H: CommandHandler> Drop for DisconnectGuard<H> {
    fn drop(&mut self) {
        self.state.handler.disconnected(self.session_id);
    }
}

// ---------------------------------------------------------------------------
// Connection loop
// ---------------------------------------------------------------------------

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<H: CommandHandler>(
    stream: TcpStream,
    peer: SocketAddr,
    state: Arc<ServerState<H>>,
) -> Result<(), CardtableError> {
    let mut session = Session::new(state.next_session_id(), peer);
    let _guard = DisconnectGuard {
        session_id: session.id(),
        state: Arc::clone(&state),
    };
    tracing::info!(session = session.id(), %peer, "client connected");

    stream.set_nodelay(true)?;
    let mut conn = TcpConnection::from_tcp(stream, state.config.stream.clone());
    conn.open().await?;

    let idle_timeout = state.config.idle_timeout();
    loop {
        let item = match tokio::time::timeout(idle_timeout, conn.recv()).await {
            Ok(Ok(Some(item))) => item,
            Ok(Ok(None)) => {
                tracing::info!(session = session.id(), "client closed the stream");
                break;
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                tracing::info!(session = session.id(), "connection idle, closing");
                break;
            }
        };

        let ProtocolItem::Command(command) = item else {
            tracing::debug!(session = session.id(), "ignoring non-command item from client");
            continue;
        };
        let cmd_id = command.cmd_id().unwrap_or(-1);
        tracing::trace!(session = session.id(), cmd_id, command = command.sub_type(), "command received");

        let reply = dispatch(&state, &mut session, &command);
        for event in reply.events {
            conn.send(event).await?;
        }
        conn.send(Response::new(cmd_id, reply.code)).await?;
    }

    conn.close().await
}

fn dispatch<H: CommandHandler>(
    state: &ServerState<H>,
    session: &mut Session,
    command: &Command,
) -> Reply {
    match command {
        Command::Ping(_) => Reply::ok(),
        Command::Login(login) => {
            let reply = state.handler.handle(session, command);
            if reply.code.is_ok() {
                tracing::info!(session = session.id(), username = %login.username, "client logged in");
                session.log_in(login.username.clone());
            }
            reply
        }
        _ if state.config.require_login && !session.is_logged_in() => {
            Reply::with_code(ResponseCode::LoginNeeded)
        }
        _ => state.handler.handle(session, command),
    }
}
