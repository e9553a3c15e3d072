//! Error types for the stream layer.

use cardtable_item::ItemError;

/// Errors that end a stream.
///
/// Anything recoverable (unknown item types, malformed scalar values) is
/// handled further down and never shows up here. Once a decoder returns
/// one of these, the connection should be dropped.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The text isn't well-formed markup.
    #[error("malformed markup: {0}")]
    Malformed(String),

    /// An `&name;` reference we can't resolve.
    #[error("unknown entity &{0};")]
    UnknownEntity(String),

    /// An incomplete token grew past the configured buffer limit.
    #[error("incomplete token exceeds {limit} bytes")]
    BufferOverflow { limit: usize },

    /// An item nests deeper than the configured limit.
    #[error("item nesting exceeds depth {limit}")]
    TooDeep { limit: usize },

    /// The stream didn't start with the expected root element.
    #[error("expected root element <{expected}>, found {found}")]
    UnexpectedRoot { expected: String, found: String },

    /// The peer speaks a different protocol version.
    #[error("protocol version mismatch: expected {expected}, got {found:?}")]
    VersionMismatch {
        expected: u32,
        found: Option<String>,
    },

    /// The input ended in the middle of an item.
    #[error("stream ended in the middle of an item")]
    UnexpectedEof,

    /// The token sequence doesn't fit the item tree.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// Reading or writing the underlying I/O object failed.
    #[error("stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
