//! # Cardtable
//!
//! Streaming item protocol and server plumbing for networked card tables.
//!
//! Clients and the server exchange one long markup document per session.
//! Every top-level element is a command, an event, or a response, decoded
//! incrementally as bytes arrive. Unknown element types from newer peers
//! are skipped rather than treated as errors.
//!
//! This crate ties the layers together:
//!
//! ```text
//! cardtable-item (item trees) → cardtable-stream (text ↔ items)
//!     → cardtable-protocol (typed messages) → cardtable (connections, server)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardtable::prelude::*;
//!
//! struct Echo;
//!
//! impl CommandHandler for Echo {
//!     fn handle(&self, _session: &mut Session, _command: &Command) -> Reply {
//!         Reply::ok()
//!     }
//! }
//!
//! # async fn run() -> Result<(), CardtableError> {
//! let server = CardtableServer::<Echo>::builder()
//!     .bind("0.0.0.0:4747")
//!     .build(Echo)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod connection;
mod error;
mod handler;
mod server;

pub use connection::{ProtocolConnection, TcpConnection};
pub use error::CardtableError;
pub use handler::{CommandHandler, Reply, Session};
pub use server::{CardtableServer, CardtableServerBuilder, ServerConfig};

pub use cardtable_item as item;
pub use cardtable_protocol as protocol;
pub use cardtable_stream as stream;

/// Everything a server or client usually needs.
pub mod prelude {
    pub use crate::{
        CardtableError, CardtableServer, CardtableServerBuilder, CommandHandler, ProtocolConnection,
        Reply, ServerConfig, Session, TcpConnection,
    };
    pub use cardtable_protocol::{
        ChatCommandScope, ChatEventScope, Command, CommandScope, Event, EventScope,
        GameCommandScope, GameEventScope, Message, ProtocolItem, Response, ResponseCode, command,
        event,
    };
    pub use cardtable_stream::StreamConfig;
}
