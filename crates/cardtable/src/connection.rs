//! A typed protocol connection: items in, items out.
//!
//! Wraps an [`ItemReader`] and [`ItemWriter`] pair with the protocol
//! registry, so callers deal in [`ProtocolItem`]s instead of raw item
//! trees. Both ends of a session use it: the server for each accepted
//! socket, clients (and tests) for the socket they dial.

use cardtable_item::Item;
use cardtable_protocol::{ProtocolItem, registry};
use cardtable_stream::{ItemReader, ItemWriter, StreamConfig};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::CardtableError;

/// One side of a protocol session.
#[derive(Debug)]
pub struct ProtocolConnection<R, W> {
    reader: ItemReader<'static, R>,
    writer: ItemWriter<W>,
}

/// A connection over a TCP socket.
pub type TcpConnection = ProtocolConnection<OwnedReadHalf, OwnedWriteHalf>;

impl TcpConnection {
    /// Wraps an already connected socket.
    pub fn from_tcp(stream: TcpStream, config: StreamConfig) -> Self {
        let (read, write) = stream.into_split();
        Self::new(read, write, config)
    }

    /// Dials `addr` and sends our root element.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        config: StreamConfig,
    ) -> Result<Self, CardtableError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let mut conn = Self::from_tcp(stream, config);
        conn.open().await?;
        Ok(conn)
    }
}

impl<R, W> ProtocolConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, config: StreamConfig) -> Self {
        Self {
            reader: ItemReader::new(reader, registry(), config.clone()),
            writer: ItemWriter::new(writer, config),
        }
    }

    /// Sends the root start tag. Sending an item does this implicitly.
    pub async fn open(&mut self) -> Result<(), CardtableError> {
        self.writer.open().await?;
        Ok(())
    }

    pub async fn send(&mut self, item: impl Into<ProtocolItem>) -> Result<(), CardtableError> {
        self.send_item(&item.into().to_item()).await
    }

    /// Sends an arbitrary item tree, protocol or not.
    pub async fn send_item(&mut self, item: &Item) -> Result<(), CardtableError> {
        self.writer.write_item(item).await?;
        Ok(())
    }

    /// Receives the next protocol item.
    ///
    /// Items this build doesn't recognize are logged and skipped.
    /// Returns `Ok(None)` once the peer ends the session.
    pub async fn recv(&mut self) -> Result<Option<ProtocolItem>, CardtableError> {
        while let Some(item) = self.reader.read_item().await? {
            match ProtocolItem::from_item(&item) {
                Ok(typed) => return Ok(Some(typed)),
                Err(e) => tracing::debug!(error = %e, "skipping unrecognized item"),
            }
        }
        Ok(None)
    }

    /// Sends the root end tag and shuts down our write side.
    pub async fn close(&mut self) -> Result<(), CardtableError> {
        self.writer.close().await?;
        Ok(())
    }
}
