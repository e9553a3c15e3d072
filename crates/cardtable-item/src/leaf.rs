//! Leaf items: elements that hold exactly one scalar value.
//!
//! There are six leaf kinds. Each one knows how to render its value as
//! character data and how to parse a chunk of character data back:
//!
//! | kind        | Rust value               | wire text                          |
//! |-------------|--------------------------|------------------------------------|
//! | `String`    | `String`                 | the raw text                       |
//! | `Int`       | `i32`                    | decimal digits                     |
//! | `Bool`      | `bool`                   | `1` or `0`                         |
//! | `Color`     | [`Color`]                | packed `0xRRGGBB` as decimal       |
//! | `DateTime`  | `Option<DateTime<Utc>>`  | Unix seconds                       |
//! | `ByteArray` | `Vec<u8>`                | base64 of a length-prefixed zlib   |
//!
//! ## Sentinels
//!
//! A stream must survive a peer that sends `<x>abc</x>` for an integer.
//! [`LeafKind::decode`] reports the problem as a [`ScalarError`], and
//! [`LeafItem`] replaces the value with the kind's sentinel (`-1`, black,
//! `None`, ...). The error is logged and goes no further.

use std::fmt;
use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::{ItemError, Progress, ScalarError, Token, TokenSink};

/// Upper bound on the buffer preallocated from a compressed payload's
/// length header. Larger payloads still decode, they just grow the buffer.
const MAX_PREALLOCATION: usize = 1 << 20;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// An RGB color, carried on the wire as one packed integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Packs the color as `0xRRGGBB`.
    pub fn to_value(self) -> i32 {
        (i32::from(self.red) << 16) | (i32::from(self.green) << 8) | i32::from(self.blue)
    }

    /// Unpacks `0xRRGGBB`. Bits above the low 24 are ignored.
    pub fn from_value(value: i32) -> Self {
        Self {
            red: ((value >> 16) & 0xff) as u8,
            green: ((value >> 8) & 0xff) as u8,
            blue: (value & 0xff) as u8,
        }
    }
}

// ---------------------------------------------------------------------------
// LeafKind / LeafValue
// ---------------------------------------------------------------------------

/// The six scalar encodings a leaf can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafKind {
    String,
    Int,
    Bool,
    Color,
    DateTime,
    ByteArray,
}

impl LeafKind {
    /// The value a freshly created leaf of this kind holds. It doubles as
    /// the sentinel substituted for malformed input.
    pub fn blank(self) -> LeafValue {
        match self {
            Self::String => LeafValue::String(String::new()),
            Self::Int => LeafValue::Int(-1),
            Self::Bool => LeafValue::Bool(false),
            Self::Color => LeafValue::Color(Color::default()),
            Self::DateTime => LeafValue::DateTime(None),
            Self::ByteArray => LeafValue::ByteArray(Vec::new()),
        }
    }

    /// Decodes one chunk of character data.
    ///
    /// # Errors
    /// Returns a [`ScalarError`] when the text isn't a valid encoding for
    /// this kind. Callers decide whether that's fatal; [`LeafItem`] never
    /// treats it as such.
    pub fn decode(self, chunk: &str) -> Result<LeafValue, ScalarError> {
        let malformed = || ScalarError::Malformed {
            kind: self,
            input: chunk.trim().to_string(),
        };

        match self {
            Self::String => Ok(LeafValue::String(chunk.to_string())),
            Self::Int => chunk
                .trim()
                .parse::<i32>()
                .map(LeafValue::Int)
                .map_err(|_| malformed()),
            Self::Bool => Ok(LeafValue::Bool(chunk == "1")),
            Self::Color => chunk
                .trim()
                .parse::<i32>()
                .map(|v| LeafValue::Color(Color::from_value(v)))
                .map_err(|_| malformed()),
            Self::DateTime => {
                let secs = chunk.trim().parse::<u32>().map_err(|_| malformed())?;
                let time = DateTime::<Utc>::from_timestamp(i64::from(secs), 0)
                    .ok_or_else(malformed)?;
                Ok(LeafValue::DateTime(Some(time)))
            }
            Self::ByteArray => {
                let compressed = STANDARD.decode(chunk.trim())?;
                decompress(&compressed).map(LeafValue::ByteArray)
            }
        }
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Color => "color",
            Self::DateTime => "date_time",
            Self::ByteArray => "byte_array",
        };
        f.write_str(name)
    }
}

/// The value held by a leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafValue {
    String(String),
    Int(i32),
    Bool(bool),
    Color(Color),
    DateTime(Option<DateTime<Utc>>),
    ByteArray(Vec<u8>),
}

impl LeafValue {
    pub fn kind(&self) -> LeafKind {
        match self {
            Self::String(_) => LeafKind::String,
            Self::Int(_) => LeafKind::Int,
            Self::Bool(_) => LeafKind::Bool,
            Self::Color(_) => LeafKind::Color,
            Self::DateTime(_) => LeafKind::DateTime,
            Self::ByteArray(_) => LeafKind::ByteArray,
        }
    }

    /// `true` when the value equals its kind's blank value. Empty leaves
    /// are left out of the serialized output entirely.
    pub fn is_empty(&self) -> bool {
        *self == self.kind().blank()
    }

    /// Renders the value as character data.
    pub fn encode(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Int(v) => v.to_string(),
            Self::Bool(v) => (if *v { "1" } else { "0" }).to_string(),
            Self::Color(c) => c.to_value().to_string(),
            Self::DateTime(Some(t)) => unix_seconds(t).to_string(),
            Self::DateTime(None) => String::new(),
            Self::ByteArray(data) => STANDARD.encode(compress(data)),
        }
    }
}

/// Whole seconds since the epoch, clamped to the `u32` range the wire
/// format carries.
fn unix_seconds(t: &DateTime<Utc>) -> u32 {
    let secs = t.timestamp();
    u32::try_from(secs).unwrap_or_else(|_| {
        tracing::debug!(secs, "timestamp outside the wire range, clamping");
        if secs < 0 { 0 } else { u32::MAX }
    })
}

// ---------------------------------------------------------------------------
// Compressed payloads
// ---------------------------------------------------------------------------

/// Big-endian length header. Payloads too long for it carry `u32::MAX`;
/// the header only sizes the decode buffer.
fn length_header(len: usize) -> [u8; 4] {
    let len = u32::try_from(len).unwrap_or_else(|_| {
        tracing::error!(len, "payload too large for its length header");
        u32::MAX
    });
    len.to_be_bytes()
}

/// Compresses `data` as a 4-byte big-endian length followed by a zlib
/// stream.
fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = length_header(data.len()).to_vec();
    let mut encoder = ZlibEncoder::new(&mut out, Compression::default());
    // Writes into a Vec only fail on allocation failure, which aborts.
    if let Err(e) = encoder.write_all(data).and_then(|()| encoder.try_finish()) {
        tracing::error!(error = %e, "zlib compression failed");
    }
    drop(encoder);
    out
}

fn decompress(payload: &[u8]) -> Result<Vec<u8>, ScalarError> {
    let Some((header, body)) = payload.split_first_chunk::<4>() else {
        return Err(ScalarError::Decompress(format!(
            "payload is {} bytes, shorter than its length header",
            payload.len()
        )));
    };
    let expected = u32::from_be_bytes(*header) as usize;

    let mut out = Vec::with_capacity(expected.min(MAX_PREALLOCATION));
    ZlibDecoder::new(body)
        .read_to_end(&mut out)
        .map_err(|e| ScalarError::Decompress(e.to_string()))?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// LeafData: typed access
// ---------------------------------------------------------------------------

/// A Rust type that can live inside a leaf.
///
/// Message structs use this to move values between their typed fields and
/// the generic [`LeafValue`] held by the item tree.
pub trait LeafData: Sized {
    /// The leaf kind used to carry this type.
    const KIND: LeafKind;

    /// Reads the value back out. A value of the wrong kind yields the
    /// blank value.
    fn from_value(value: &LeafValue) -> Self;

    fn into_value(self) -> LeafValue;

    /// The sentinel/default for this type.
    fn blank() -> Self {
        Self::from_value(&Self::KIND.blank())
    }
}

impl LeafData for String {
    const KIND: LeafKind = LeafKind::String;

    fn from_value(value: &LeafValue) -> Self {
        match value {
            LeafValue::String(s) => s.clone(),
            _ => String::new(),
        }
    }

    fn into_value(self) -> LeafValue {
        LeafValue::String(self)
    }
}

impl LeafData for i32 {
    const KIND: LeafKind = LeafKind::Int;

    fn from_value(value: &LeafValue) -> Self {
        match value {
            LeafValue::Int(v) => *v,
            _ => -1,
        }
    }

    fn into_value(self) -> LeafValue {
        LeafValue::Int(self)
    }
}

impl LeafData for bool {
    const KIND: LeafKind = LeafKind::Bool;

    fn from_value(value: &LeafValue) -> Self {
        matches!(value, LeafValue::Bool(true))
    }

    fn into_value(self) -> LeafValue {
        LeafValue::Bool(self)
    }
}

impl LeafData for Color {
    const KIND: LeafKind = LeafKind::Color;

    fn from_value(value: &LeafValue) -> Self {
        match value {
            LeafValue::Color(c) => *c,
            _ => Color::default(),
        }
    }

    fn into_value(self) -> LeafValue {
        LeafValue::Color(self)
    }
}

/// Whole seconds from 1970 to 2106 (`u32` Unix time). Earlier or later
/// instants are clamped to that range when written, and sub-second
/// precision is dropped.
impl LeafData for Option<DateTime<Utc>> {
    const KIND: LeafKind = LeafKind::DateTime;

    fn from_value(value: &LeafValue) -> Self {
        match value {
            LeafValue::DateTime(t) => *t,
            _ => None,
        }
    }

    fn into_value(self) -> LeafValue {
        LeafValue::DateTime(self)
    }
}

impl LeafData for Vec<u8> {
    const KIND: LeafKind = LeafKind::ByteArray;

    fn from_value(value: &LeafValue) -> Self {
        match value {
            LeafValue::ByteArray(data) => data.clone(),
            _ => Vec::new(),
        }
    }

    fn into_value(self) -> LeafValue {
        LeafValue::ByteArray(self)
    }
}

// ---------------------------------------------------------------------------
// LeafItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LeafState {
    /// Nothing received yet; the next start tag is our own.
    Fresh,
    /// Inside our element, collecting character data.
    Open,
    /// Our end tag arrived.
    Closed,
}

/// An element holding one scalar value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafItem {
    item_type: String,
    value: LeafValue,
    state: LeafState,
}

impl LeafItem {
    /// A leaf named `item_type` holding `value`.
    pub fn new(item_type: impl Into<String>, value: LeafValue) -> Self {
        Self {
            item_type: item_type.into(),
            value,
            state: LeafState::Fresh,
        }
    }

    /// A leaf holding the blank value of `kind`, ready to be parsed into.
    pub fn blank(item_type: impl Into<String>, kind: LeafKind) -> Self {
        Self::new(item_type, kind.blank())
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn kind(&self) -> LeafKind {
        self.value.kind()
    }

    pub fn value(&self) -> &LeafValue {
        &self.value
    }

    /// Replaces the value. A value of a different kind changes the leaf's
    /// kind with it.
    pub fn set_value(&mut self, value: LeafValue) {
        self.value = value;
    }

    /// The value as a typed Rust value.
    pub fn data<T: LeafData>(&self) -> T {
        T::from_value(&self.value)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state == LeafState::Closed
    }

    /// Prepares an already parsed leaf to be parsed again. A repeated
    /// element replaces the earlier value rather than extending it.
    pub(crate) fn reopen(&mut self) {
        self.state = LeafState::Fresh;
        self.value = self.value.kind().blank();
    }

    /// Consumes one token.
    ///
    /// # Errors
    /// Structural problems only: a nested start tag, a foreign end tag, or
    /// any token after the leaf closed. Malformed values are not errors.
    pub fn feed(&mut self, token: &Token) -> Result<Progress, ItemError> {
        match self.state {
            LeafState::Closed => {
                return Err(ItemError::AlreadyClosed(self.item_type.clone()));
            }
            LeafState::Fresh => {
                self.state = LeafState::Open;
                if matches!(token, Token::Start { .. }) {
                    return Ok(Progress::Pending);
                }
            }
            LeafState::Open => {}
        }

        match token {
            Token::Start { name, .. } => Err(ItemError::UnexpectedStart {
                parent: self.item_type.clone(),
                found: name.clone(),
            }),
            Token::End { name } if *name == self.item_type => {
                self.state = LeafState::Closed;
                Ok(Progress::Complete)
            }
            Token::End { name } => Err(ItemError::UnexpectedEnd {
                expected: self.item_type.clone(),
                found: name.clone(),
            }),
            Token::Characters(text) => {
                self.read_characters(text);
                Ok(Progress::Pending)
            }
        }
    }

    fn read_characters(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        // Text nodes can arrive in several chunks, so strings grow.
        if let LeafValue::String(data) = &mut self.value {
            data.push_str(text);
            return;
        }

        let kind = self.value.kind();
        self.value = match kind.decode(text) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(
                    item = %self.item_type,
                    error = %e,
                    "substituting sentinel for malformed value"
                );
                kind.blank()
            }
        };
    }

    /// Emits `<item_type>text</item_type>`.
    pub fn write(&self, sink: &mut dyn TokenSink) {
        sink.push(Token::start(self.item_type.clone()));
        let text = self.value.encode();
        if !text.is_empty() {
            sink.push(Token::Characters(text));
        }
        sink.push(Token::end(self.item_type.clone()));
    }
}
