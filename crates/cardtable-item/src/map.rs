//! Composite items and the incremental parse state machine.
//!
//! A [`MapItem`] owns two kinds of children:
//!
//! - **named** children, declared up front (usually from a [`Field`]
//!   table), at most one per element name, written in declaration order;
//! - **repeated** children, discovered while parsing and appended in
//!   document order. Their concrete type comes from the [`Registry`].
//!
//! ## Parsing
//!
//! The parser is push-driven: the stream driver hands over one token at a
//! time and the container reacts without lookahead.
//!
//! ```text
//!                      any token (own start tag)
//!  ExpectingFirstToken ─────────────────────────→ ExpectingNextToken
//!                                                   │    ↑       │
//!                              <child …> (resolve)  │    │       │ </item_type>
//!                                                   ▼    │       ▼
//!                                  Delegating(child) ────┘     Closed
//!                                        child reports Complete
//! ```
//!
//! Only one child is active at a time, so memory grows with nesting
//! depth, never with the number of siblings.

use crate::{
    Attributes, Field, InvalidItem, Item, ItemError, LeafData, LeafItem,
    Progress, Registry, SUB_TYPE_ATTRIBUTE, Token, TokenSink,
};

/// Which child is receiving tokens. Indices stay valid because children
/// are only ever appended while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Named(usize),
    Repeated(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapState {
    ExpectingFirstToken,
    ExpectingNextToken,
    Delegating(Slot),
    Closed,
}

/// A composite element with named and repeated children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapItem {
    item_type: String,
    sub_type: String,
    /// Attributes of our own start tag other than `type`.
    attributes: Attributes,
    named: Vec<Item>,
    repeated: Vec<Item>,
    state: MapState,
}

impl MapItem {
    /// An empty container with no declared children.
    pub fn new(item_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            sub_type: sub_type.into(),
            attributes: Attributes::new(),
            named: Vec::new(),
            repeated: Vec::new(),
            state: MapState::ExpectingFirstToken,
        }
    }

    /// A container whose named children are blank instances of `fields`,
    /// in the order given.
    pub fn from_fields(
        item_type: impl Into<String>,
        sub_type: impl Into<String>,
        fields: &[Field],
    ) -> Self {
        let mut map = Self::new(item_type, sub_type);
        map.named = fields.iter().map(Field::instantiate).collect();
        map
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    // -- Attributes --

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Sets an attribute written on our start tag. The `type` attribute is
    /// reserved for the subtype and can't be set this way.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        if name == SUB_TYPE_ATTRIBUTE {
            tracing::warn!(item = %self.item_type, "ignoring attempt to overwrite the subtype attribute");
            return;
        }
        self.attributes.insert(name, value);
    }

    // -- Named children --

    pub fn named(&self, name: &str) -> Option<&Item> {
        self.named.iter().find(|child| child.item_type() == name)
    }

    pub fn named_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.named.iter_mut().find(|child| child.item_type() == name)
    }

    /// All named children, in declaration order.
    pub fn named_children(&self) -> &[Item] {
        &self.named
    }

    /// Adds a named child, replacing (in place) any child with the same
    /// element name.
    pub fn insert_named(&mut self, child: impl Into<Item>) {
        let child = child.into();
        match self.named_mut(child.item_type()) {
            Some(slot) => *slot = child,
            None => self.named.push(child),
        }
    }

    /// The typed value of the named leaf `name`, or the type's blank
    /// value if there is no such leaf.
    pub fn leaf_data<T: LeafData>(&self, name: &str) -> T {
        self.named(name)
            .and_then(Item::as_leaf)
            .map(LeafItem::data::<T>)
            .unwrap_or_else(T::blank)
    }

    /// Stores `value` in the named leaf `name`, creating the leaf if the
    /// container doesn't declare it.
    pub fn set_leaf<T: LeafData>(&mut self, name: &str, value: T) {
        match self.named_mut(name) {
            Some(Item::Leaf(leaf)) => leaf.set_value(value.into_value()),
            _ => self.insert_named(LeafItem::new(name, value.into_value())),
        }
    }

    // -- Repeated children --

    /// Repeated children, in document (or append) order.
    pub fn repeated(&self) -> &[Item] {
        &self.repeated
    }

    pub fn push_repeated(&mut self, child: impl Into<Item>) {
        self.repeated.push(child.into());
    }

    /// Repeated composite children of one element type and subtype.
    pub fn repeated_maps<'a>(
        &'a self,
        item_type: &'a str,
        sub_type: &'a str,
    ) -> impl Iterator<Item = &'a MapItem> + 'a {
        self.repeated.iter().filter_map(Item::as_map).filter(move |map| {
            map.item_type() == item_type && map.sub_type() == sub_type
        })
    }

    // -- State --

    /// `true` when no child carries data. An empty container is skipped
    /// by its parent, just like an empty leaf.
    pub fn is_empty(&self) -> bool {
        self.named.iter().chain(&self.repeated).all(Item::is_empty)
    }

    pub fn is_closed(&self) -> bool {
        self.state == MapState::Closed
    }

    /// Blanks the container before a repeated element is read into it,
    /// so nothing from the earlier occurrence survives.
    pub(crate) fn reopen(&mut self) {
        self.state = MapState::ExpectingFirstToken;
        self.attributes = Attributes::new();
        for child in &mut self.named {
            child.reopen();
        }
        self.repeated.clear();
    }

    // -- Parsing --

    /// Consumes one token.
    ///
    /// # Errors
    /// Returns [`ItemError::UnexpectedEnd`] when an end tag doesn't close
    /// the innermost open element, and [`ItemError::AlreadyClosed`] when
    /// tokens keep coming after our own end tag. Errors raised by the
    /// active child propagate unchanged.
    pub fn feed(
        &mut self,
        token: &Token,
        registry: &Registry,
    ) -> Result<Progress, ItemError> {
        match self.state {
            MapState::Closed => {
                Err(ItemError::AlreadyClosed(self.item_type.clone()))
            }

            MapState::ExpectingFirstToken => {
                // Our own start tag. The caller already matched the name;
                // only the attributes are of interest.
                if let Token::Start { attributes, .. } = token {
                    self.attributes = attributes
                        .iter()
                        .filter(|(name, _)| *name != SUB_TYPE_ATTRIBUTE)
                        .collect();
                }
                self.state = MapState::ExpectingNextToken;
                Ok(Progress::Pending)
            }

            MapState::Delegating(slot) => {
                if self.child_mut(slot).feed(token, registry)? == Progress::Complete {
                    self.state = MapState::ExpectingNextToken;
                }
                Ok(Progress::Pending)
            }

            MapState::ExpectingNextToken => match token {
                Token::End { name } if *name == self.item_type => {
                    self.state = MapState::Closed;
                    Ok(Progress::Complete)
                }
                Token::End { name } => Err(ItemError::UnexpectedEnd {
                    expected: self.item_type.clone(),
                    found: name.clone(),
                }),
                // Containers hold no text of their own.
                Token::Characters(_) => Ok(Progress::Pending),
                Token::Start { name, attributes } => {
                    let slot = self.resolve_child(name, attributes.sub_type(), registry);
                    if self.child_mut(slot).feed(token, registry)? == Progress::Pending {
                        self.state = MapState::Delegating(slot);
                    }
                    Ok(Progress::Pending)
                }
            },
        }
    }

    /// Picks the child that will receive `<name type="sub_type">`: a
    /// declared named child, a registry-built repeated child, or an
    /// invalid placeholder.
    fn resolve_child(
        &mut self,
        name: &str,
        sub_type: &str,
        registry: &Registry,
    ) -> Slot {
        if let Some(index) = self.named.iter().position(|c| c.item_type() == name) {
            let child = &mut self.named[index];
            if child.is_closed() {
                tracing::debug!(parent = %self.item_type, element = name, "element repeated, keeping the last one");
                child.reopen();
            }
            return Slot::Named(index);
        }

        let child = registry.create(name, sub_type).unwrap_or_else(|| {
            tracing::debug!(
                parent = %self.item_type,
                element = name,
                sub_type,
                "unregistered element, reading as invalid"
            );
            Item::Invalid(InvalidItem::new(name))
        });
        self.repeated.push(child);
        Slot::Repeated(self.repeated.len() - 1)
    }

    fn child_mut(&mut self, slot: Slot) -> &mut Item {
        match slot {
            Slot::Named(index) => &mut self.named[index],
            Slot::Repeated(index) => &mut self.repeated[index],
        }
    }

    // -- Writing --

    /// Emits our start tag (with the subtype and any attributes), every
    /// non-empty child, and our end tag.
    pub fn write(&self, sink: &mut dyn TokenSink) {
        let mut attributes = Attributes::new();
        if !self.sub_type.is_empty() {
            attributes.insert(SUB_TYPE_ATTRIBUTE, self.sub_type.as_str());
        }
        for (name, value) in self.attributes.iter() {
            attributes.insert(name, value);
        }

        sink.push(Token::Start {
            name: self.item_type.clone(),
            attributes,
        });
        for child in self.named.iter().chain(&self.repeated) {
            if !child.is_empty() {
                child.write(sink);
            }
        }
        sink.push(Token::end(self.item_type.clone()));
    }
}
