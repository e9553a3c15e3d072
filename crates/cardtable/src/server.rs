//! `CardtableServer` builder and accept loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cardtable_stream::StreamConfig;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use crate::CardtableError;
use crate::handler::{CommandHandler, handle_connection};

/// Server settings.
///
/// `#[serde(default)]` lets a config file override only some fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on, e.g. `"0.0.0.0:4747"`.
    pub bind_addr: String,

    /// Framing and limits for every connection.
    pub stream: StreamConfig,

    /// Seconds without a complete item before a connection is closed.
    pub idle_timeout_secs: u64,

    /// Answer commands other than `ping` and `login` with
    /// `login_needed` until the client logs in.
    pub require_login: bool,
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:4747".to_string(),
            stream: StreamConfig::default(),
            idle_timeout_secs: 60,
            require_login: true,
        }
    }
}

/// Shared state handed to each connection task.
pub(crate) struct ServerState<H: CommandHandler> {
    pub(crate) handler: H,
    pub(crate) config: ServerConfig,
    next_session: AtomicU64,
}

impl<H: CommandHandler> ServerState<H> {
    pub(crate) fn next_session_id(&self) -> u64 {
        self.next_session.fetch_add(1, Ordering::Relaxed)
    }
}

/// Builder for configuring and starting a Cardtable server.
///
/// # Example
///
/// ```rust,ignore
/// use cardtable::prelude::*;
///
/// let server = CardtableServer::builder()
///     .bind("0.0.0.0:4747")
///     .build(MyHandler::default())
///     .await?;
/// server.run().await
/// ```
#[derive(Debug, Clone, Default)]
pub struct CardtableServerBuilder {
    config: ServerConfig,
}

impl CardtableServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn stream_config(mut self, stream: StreamConfig) -> Self {
        self.config.stream = stream;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn require_login(mut self, require: bool) -> Self {
        self.config.require_login = require;
        self
    }

    /// Binds the listener.
    pub async fn build<H: CommandHandler>(
        self,
        handler: H,
    ) -> Result<CardtableServer<H>, CardtableError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "listening");

        let state = Arc::new(ServerState {
            handler,
            config: self.config,
            next_session: AtomicU64::new(1),
        });
        Ok(CardtableServer { listener, state })
    }
}

/// A bound Cardtable server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CardtableServer<H: CommandHandler> {
    listener: TcpListener,
    state: Arc<ServerState<H>>,
}

impl<H: CommandHandler> CardtableServer<H> {
    pub fn builder() -> CardtableServerBuilder {
        CardtableServerBuilder::new()
    }

    /// The address actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, one task per client.
    pub async fn run(self) -> Result<(), CardtableError> {
        tracing::info!("cardtable server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, state).await {
                            tracing::debug!(%peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
