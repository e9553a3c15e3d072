//! Wire driver for Cardtable item streams.
//!
//! This crate sits between raw bytes and the item tree from
//! `cardtable-item`:
//!
//! - [`Tokenizer`] splits incoming text into start/end/characters tokens,
//!   tolerating input that arrives in arbitrary chunks.
//! - [`MarkupWriter`] renders tokens back to escaped text.
//! - [`StreamDecoder`] and [`StreamEncoder`] handle the root element and
//!   turn each top-level element into an item.
//! - [`ItemReader`] and [`ItemWriter`] do the same over tokio I/O.

mod codec;
mod config;
mod error;
mod io;
mod tokenizer;
mod writer;

pub use codec::{Decoded, StreamDecoder, StreamEncoder, VERSION_ATTRIBUTE};
pub use config::{DEFAULT_ROOT_ELEMENT, PROTOCOL_VERSION, StreamConfig};
pub use error::StreamError;
pub use io::{ItemReader, ItemWriter};
pub use tokenizer::Tokenizer;
pub use writer::MarkupWriter;
