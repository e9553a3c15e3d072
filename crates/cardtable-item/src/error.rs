//! Error types for the item layer.
//!
//! Two very different kinds of failure live here:
//!
//! - [`ScalarError`] is *recoverable*. A leaf that receives text it can't
//!   parse reports it, and [`LeafItem`](crate::LeafItem) swaps in the
//!   kind's sentinel value. These errors never leave the leaf.
//! - [`ItemError`] is *structural*. The token sequence no longer matches
//!   the tree being built, so continuing would desynchronize every open
//!   container. These propagate all the way up to the stream driver.

use crate::LeafKind;

/// A character-data chunk could not be decoded as a leaf value.
#[derive(Debug, thiserror::Error)]
pub enum ScalarError {
    /// The text isn't a valid number for an Int, Color, or DateTime leaf.
    #[error("malformed {kind} value: {input:?}")]
    Malformed {
        /// Which leaf kind rejected the text.
        kind: LeafKind,
        /// The offending text (trimmed).
        input: String,
    },

    /// The text of a ByteArray leaf isn't valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes aren't a valid compressed payload.
    #[error("invalid compressed payload: {0}")]
    Decompress(String),
}

/// The token stream doesn't fit the item tree.
///
/// Every variant means the stream is corrupt or truncated in a way the
/// parser can't recover from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    /// An end tag closed something other than the innermost open element.
    #[error("unexpected end tag </{found}> while reading <{expected}>")]
    UnexpectedEnd {
        /// The element that should have been closed.
        expected: String,
        /// The element name the end tag actually carried.
        found: String,
    },

    /// A start tag appeared inside an element that can't hold children.
    #[error("unexpected start tag <{found}> inside leaf <{parent}>")]
    UnexpectedStart {
        /// The leaf element that was open.
        parent: String,
        /// The start tag that arrived.
        found: String,
    },

    /// A token arrived after the item had already been closed.
    #[error("item <{0}> is already closed")]
    AlreadyClosed(String),
}
