//! Self-describing item trees for Cardtable's wire format.
//!
//! Everything that travels between client and server is an *item*: an
//! element with a name, an optional `type` discriminator, and either one
//! scalar value (a leaf) or child items (a map). This crate provides:
//!
//! - **Tokens** ([`Token`], [`TokenSink`]): the start/end/characters
//!   vocabulary items are read from and written to.
//! - **Leaves** ([`LeafItem`], [`LeafKind`], [`LeafValue`]): the six
//!   scalar codecs.
//! - **Maps** ([`MapItem`]): composites with the incremental parse state
//!   machine.
//! - **Registry** ([`Registry`]): factories for child types a parent
//!   doesn't know statically.
//! - **Schema** ([`Field`]): static tables of named children.
//!
//! # Architecture
//!
//! The crate knows nothing about sockets or markup syntax. A stream
//! driver tokenizes the input and pushes tokens in; writing produces
//! tokens for the driver to render.
//!
//! ```text
//! Stream driver (text ↔ tokens) → Item tree (tokens ↔ values) → Messages
//! ```

mod error;
mod invalid;
mod item;
mod leaf;
mod map;
mod registry;
mod schema;
mod token;

pub use error::{ItemError, ScalarError};
pub use invalid::InvalidItem;
pub use item::{Item, Progress};
pub use leaf::{Color, LeafData, LeafItem, LeafKind, LeafValue};
pub use map::MapItem;
pub use registry::{Factory, Registry, RegistryBuilder};
pub use schema::{Field, FieldKind};
pub use token::{Attributes, SUB_TYPE_ATTRIBUTE, Token, TokenSink};
