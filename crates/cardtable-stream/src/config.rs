//! Stream configuration.

use serde::{Deserialize, Serialize};

/// Element that wraps a whole session's worth of items.
pub const DEFAULT_ROOT_ELEMENT: &str = "cardtable_stream";

/// The protocol version this build speaks.
pub const PROTOCOL_VERSION: u32 = 1;

/// Settings shared by the decoder, encoder, and async reader.
///
/// `#[serde(default)]` lets a config file name only the fields it wants
/// to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Name of the root element opened at the start of a session.
    pub root_element: String,

    /// Version written on (and required of) the root element.
    pub protocol_version: u32,

    /// Deepest element nesting accepted inside one top-level item.
    pub max_depth: usize,

    /// Largest incomplete token the tokenizer will buffer, in bytes.
    pub max_buffer_len: usize,

    /// Size of each read from the underlying I/O object, in bytes.
    pub read_chunk_len: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            root_element: DEFAULT_ROOT_ELEMENT.to_string(),
            protocol_version: PROTOCOL_VERSION,
            max_depth: 64,
            max_buffer_len: 1 << 20,
            read_chunk_len: 8 * 1024,
        }
    }
}
