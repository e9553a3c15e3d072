//! The [`Item`] sum type: every node of a serialized tree.

use crate::{
    InvalidItem, ItemError, LeafItem, MapItem, Registry, Token, TokenSink,
};

/// What a `feed` call left behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The item's element is still open; keep feeding it.
    Pending,
    /// The item's end tag arrived; the item is fully read.
    Complete,
}

/// A (de)serializable node: a scalar leaf, a composite, or a placeholder
/// for an element nobody registered.
///
/// Rather than a trait object per message type, the tree is built from
/// these three shapes. Concrete protocol messages are described by a field
/// table and converted to and from a [`MapItem`] at the edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Leaf(LeafItem),
    Map(MapItem),
    Invalid(InvalidItem),
}

impl Item {
    /// The element name used on the wire.
    pub fn item_type(&self) -> &str {
        match self {
            Self::Leaf(leaf) => leaf.item_type(),
            Self::Map(map) => map.item_type(),
            Self::Invalid(invalid) => invalid.item_type(),
        }
    }

    /// The `type` discriminator, `""` if there is none.
    pub fn sub_type(&self) -> &str {
        match self {
            Self::Map(map) => map.sub_type(),
            Self::Invalid(invalid) => invalid.sub_type(),
            Self::Leaf(_) => "",
        }
    }

    /// `true` when the item carries no data and should be left out of the
    /// serialized output.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Invalid(_) => true,
        }
    }

    /// `true` once the item's end tag has been consumed.
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.is_closed(),
            Self::Map(map) => map.is_closed(),
            Self::Invalid(invalid) => invalid.is_closed(),
        }
    }

    /// Pushes one token into the item.
    ///
    /// The first token an item sees is its own start tag. `registry` is
    /// consulted when a composite meets a child it didn't declare.
    ///
    /// # Errors
    /// Returns an [`ItemError`] when the token sequence can't belong to
    /// this item. The stream is unusable after that.
    pub fn feed(
        &mut self,
        token: &Token,
        registry: &Registry,
    ) -> Result<Progress, ItemError> {
        match self {
            Self::Leaf(leaf) => leaf.feed(token),
            Self::Map(map) => map.feed(token, registry),
            Self::Invalid(invalid) => invalid.feed(token),
        }
    }

    /// Emits the item's tokens, including its own start and end tags.
    ///
    /// This always writes. Parents check [`is_empty`](Self::is_empty)
    /// before calling it on a child.
    pub fn write(&self, sink: &mut dyn TokenSink) {
        match self {
            Self::Leaf(leaf) => leaf.write(sink),
            Self::Map(map) => map.write(sink),
            Self::Invalid(_) => {}
        }
    }

    pub(crate) fn reopen(&mut self) {
        match self {
            Self::Leaf(leaf) => leaf.reopen(),
            Self::Map(map) => map.reopen(),
            Self::Invalid(_) => {}
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafItem> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapItem> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut MapItem> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<MapItem> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

impl From<LeafItem> for Item {
    fn from(leaf: LeafItem) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<MapItem> for Item {
    fn from(map: MapItem) -> Self {
        Self::Map(map)
    }
}

impl From<InvalidItem> for Item {
    fn from(invalid: InvalidItem) -> Self {
        Self::Invalid(invalid)
    }
}
