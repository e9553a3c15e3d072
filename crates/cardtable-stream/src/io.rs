//! Async item streams over tokio I/O objects.

use cardtable_item::{Item, Registry};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Decoded, StreamConfig, StreamDecoder, StreamEncoder, StreamError};

/// Reads top-level items from an [`AsyncRead`].
#[derive(Debug)]
pub struct ItemReader<'r, R> {
    inner: R,
    decoder: StreamDecoder<'r>,
    chunk: Vec<u8>,
}

impl<'r, R> ItemReader<'r, R> {
    pub fn new(inner: R, registry: &'r Registry, config: StreamConfig) -> Self {
        Self {
            inner,
            chunk: vec![0; config.read_chunk_len.max(1)],
            decoder: StreamDecoder::new(registry, config),
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin> ItemReader<'_, R> {
    /// Reads the next top-level item.
    ///
    /// Returns:
    /// - `Ok(Some(item))` for a complete item (possibly [`Item::Invalid`]),
    /// - `Ok(None)` once the peer closed its root element, or on EOF
    ///   between items.
    ///
    /// # Errors
    /// Any decoding error, an I/O error, or [`StreamError::UnexpectedEof`]
    /// when the connection drops in the middle of an item.
    pub async fn read_item(&mut self) -> Result<Option<Item>, StreamError> {
        loop {
            match self.decoder.next_item()? {
                Decoded::Item(item) => return Ok(Some(item)),
                Decoded::Finished => return Ok(None),
                Decoded::Pending => {}
            }

            let n = self.inner.read(&mut self.chunk).await?;
            if n == 0 {
                if self.decoder.is_mid_item() {
                    return Err(StreamError::UnexpectedEof);
                }
                return Ok(None);
            }
            self.decoder.push_bytes(&self.chunk[..n])?;
        }
    }
}

/// Writes top-level items to an [`AsyncWrite`], flushing after each one.
#[derive(Debug)]
pub struct ItemWriter<W> {
    inner: W,
    encoder: StreamEncoder,
}

impl<W> ItemWriter<W> {
    pub fn new(inner: W, config: StreamConfig) -> Self {
        Self {
            inner,
            encoder: StreamEncoder::new(config),
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin> ItemWriter<W> {
    /// Sends the root start tag. Writing an item does this implicitly.
    pub async fn open(&mut self) -> Result<(), StreamError> {
        self.encoder.open();
        self.flush_encoded().await
    }

    pub async fn write_item(&mut self, item: &Item) -> Result<(), StreamError> {
        self.encoder.encode(item);
        self.flush_encoded().await
    }

    /// Sends the root end tag and shuts down the write side.
    pub async fn close(&mut self) -> Result<(), StreamError> {
        self.encoder.close();
        self.flush_encoded().await?;
        self.inner.shutdown().await?;
        Ok(())
    }

    async fn flush_encoded(&mut self) -> Result<(), StreamError> {
        let text = self.encoder.take_output();
        if !text.is_empty() {
            self.inner.write_all(text.as_bytes()).await?;
        }
        self.inner.flush().await?;
        Ok(())
    }
}
