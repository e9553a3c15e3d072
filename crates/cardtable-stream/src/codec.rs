//! Stream-level framing: the root element and the top-level items in it.
//!
//! A session's traffic in either direction is one long document:
//!
//! ```text
//! <cardtable_stream version="1">
//!   <command type="ping" cmd_id="1"></command>
//!   <command type="say" cmd_id="2" game_id="4"><message>hi</message></command>
//!   ...
//! </cardtable_stream>
//! ```
//!
//! [`StreamDecoder`] checks the root, then builds one item per top-level
//! element through the registry. [`StreamEncoder`] produces the same
//! shape. Neither does any I/O.

use cardtable_item::{InvalidItem, Item, ItemError, Progress, Registry, Token, TokenSink};

use crate::{MarkupWriter, StreamConfig, StreamError, Tokenizer};

/// Attribute on the root element that carries the protocol version.
pub const VERSION_ATTRIBUTE: &str = "version";

/// What [`StreamDecoder::next_item`] produced.
#[derive(Debug)]
pub enum Decoded {
    /// A complete top-level item.
    Item(Item),
    /// More input is needed.
    Pending,
    /// The peer closed the root element. Nothing more will come.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RootState {
    AwaitingRoot,
    Open,
    Finished,
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Turns pushed input into top-level items.
#[derive(Debug)]
pub struct StreamDecoder<'r> {
    registry: &'r Registry,
    config: StreamConfig,
    tokenizer: Tokenizer,
    state: RootState,
    current: Option<Item>,
    depth: usize,
}

impl<'r> StreamDecoder<'r> {
    pub fn new(registry: &'r Registry, config: StreamConfig) -> Self {
        Self {
            registry,
            tokenizer: Tokenizer::new(config.max_buffer_len),
            config,
            state: RootState::AwaitingRoot,
            current: None,
            depth: 0,
        }
    }

    pub fn push_str(&mut self, text: &str) {
        self.tokenizer.push_str(text);
    }

    /// # Errors
    /// Fails on input that isn't valid UTF-8.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        self.tokenizer.push_bytes(bytes)
    }

    /// True once the peer's root element has closed.
    pub fn is_finished(&self) -> bool {
        self.state == RootState::Finished
    }

    /// True when input ending now would cut an item short.
    pub fn is_mid_item(&self) -> bool {
        self.current.is_some() || self.tokenizer.has_pending_input()
    }

    /// Runs the buffered input through the item tree until an item
    /// completes or the input runs out.
    ///
    /// Top-level elements nobody registered come back as
    /// [`Item::Invalid`] so the caller can log them.
    ///
    /// # Errors
    /// Any [`StreamError`] is fatal to the stream.
    pub fn next_item(&mut self) -> Result<Decoded, StreamError> {
        loop {
            if self.state == RootState::Finished {
                return Ok(Decoded::Finished);
            }
            let Some(token) = self.tokenizer.next_token()? else {
                return Ok(Decoded::Pending);
            };
            if let Some(item) = self.feed(token)? {
                return Ok(Decoded::Item(item));
            }
        }
    }

    fn feed(&mut self, token: Token) -> Result<Option<Item>, StreamError> {
        match self.state {
            RootState::AwaitingRoot => {
                self.open_root(token)?;
                Ok(None)
            }
            RootState::Open => self.feed_item(token),
            RootState::Finished => Ok(None),
        }
    }

    fn open_root(&mut self, token: Token) -> Result<(), StreamError> {
        match token {
            Token::Characters(text) if text.trim().is_empty() => Ok(()),
            Token::Start { name, attributes } if name == self.config.root_element => {
                let found = attributes.get(VERSION_ATTRIBUTE);
                if found.and_then(|v| v.parse::<u32>().ok()) != Some(self.config.protocol_version) {
                    return Err(StreamError::VersionMismatch {
                        expected: self.config.protocol_version,
                        found: found.map(str::to_string),
                    });
                }
                tracing::debug!(root = %name, version = self.config.protocol_version, "stream opened");
                self.state = RootState::Open;
                Ok(())
            }
            other => Err(StreamError::UnexpectedRoot {
                expected: self.config.root_element.clone(),
                found: other.to_string(),
            }),
        }
    }

    fn feed_item(&mut self, token: Token) -> Result<Option<Item>, StreamError> {
        if self.current.is_none() {
            match &token {
                Token::Start { name, attributes } => {
                    let sub_type = attributes.sub_type();
                    let item = self.registry.create(name, sub_type).unwrap_or_else(|| {
                        tracing::debug!(element = %name, sub_type, "unregistered top-level element");
                        InvalidItem::new(name.as_str()).into()
                    });
                    self.current = Some(item);
                    self.depth = 0;
                }
                Token::End { name } if *name == self.config.root_element => {
                    tracing::debug!("peer closed the stream");
                    self.state = RootState::Finished;
                    return Ok(None);
                }
                Token::End { name } => {
                    return Err(ItemError::UnexpectedEnd {
                        expected: self.config.root_element.clone(),
                        found: name.clone(),
                    }
                    .into());
                }
                // Whitespace between items.
                Token::Characters(_) => return Ok(None),
            }
        }

        match &token {
            Token::Start { .. } => {
                self.depth += 1;
                if self.depth > self.config.max_depth {
                    return Err(StreamError::TooDeep {
                        limit: self.config.max_depth,
                    });
                }
            }
            Token::End { .. } => self.depth = self.depth.saturating_sub(1),
            Token::Characters(_) => {}
        }

        let Some(item) = self.current.as_mut() else {
            return Ok(None);
        };
        match item.feed(&token, self.registry)? {
            Progress::Complete => Ok(self.current.take()),
            Progress::Pending => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Renders the root element and top-level items as text.
#[derive(Debug)]
pub struct StreamEncoder {
    config: StreamConfig,
    writer: MarkupWriter,
    opened: bool,
    closed: bool,
}

impl StreamEncoder {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            writer: MarkupWriter::new(),
            opened: false,
            closed: false,
        }
    }

    /// Writes the root start tag. Later calls do nothing.
    pub fn open(&mut self) {
        if self.opened {
            return;
        }
        self.opened = true;
        let mut start = Token::start(self.config.root_element.as_str());
        if let Token::Start { attributes, .. } = &mut start {
            attributes.insert(VERSION_ATTRIBUTE, self.config.protocol_version.to_string());
        }
        self.writer.push(start);
    }

    /// Writes one top-level item, opening the root first if needed.
    ///
    /// The item is written even when it has no content.
    pub fn encode(&mut self, item: &Item) {
        self.open();
        item.write(&mut self.writer);
    }

    /// Writes the root end tag. Later calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.open();
        self.closed = true;
        self.writer.push(Token::end(self.config.root_element.as_str()));
    }

    pub fn is_open(&self) -> bool {
        self.opened && !self.closed
    }

    /// Removes and returns the text rendered since the last call.
    pub fn take_output(&mut self) -> String {
        self.writer.take()
    }
}
