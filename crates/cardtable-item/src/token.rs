//! The token vocabulary shared by the parser and the writer.
//!
//! Items never see raw characters. A stream driver turns the wire text
//! into a flat sequence of [`Token`]s and pushes them, one at a time, into
//! the item tree. Writing goes the other way: an item emits tokens into a
//! [`TokenSink`], and the driver renders them as text.

use std::fmt;

/// Name of the attribute that carries an item's subtype discriminator.
pub const SUB_TYPE_ATTRIBUTE: &str = "type";

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// The attributes of a start tag, in document order.
///
/// Elements carry at most a handful of attributes (the `type`
/// discriminator plus a message's scope fields), so a `Vec` with linear
/// lookup beats a hash map here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `name` to `value`, replacing an earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Removes `name` and returns its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    /// The subtype discriminator, or `""` when the tag has none.
    pub fn sub_type(&self) -> &str {
        self.get(SUB_TYPE_ATTRIBUTE).unwrap_or("")
    }

    /// Iterates over `(name, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// One structural event of the markup stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An element opened.
    Start { name: String, attributes: Attributes },

    /// An element closed.
    End { name: String },

    /// A run of character data. A single text node may arrive as several
    /// consecutive `Characters` tokens (the reader splits at entities).
    Characters(String),
}

impl Token {
    /// A start tag without attributes.
    pub fn start(name: impl Into<String>) -> Self {
        Self::Start {
            name: name.into(),
            attributes: Attributes::new(),
        }
    }

    /// A start tag carrying a `type` discriminator.
    pub fn start_with_sub_type(
        name: impl Into<String>,
        sub_type: impl Into<String>,
    ) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(SUB_TYPE_ATTRIBUTE, sub_type);
        Self::Start {
            name: name.into(),
            attributes,
        }
    }

    pub fn end(name: impl Into<String>) -> Self {
        Self::End { name: name.into() }
    }

    pub fn characters(text: impl Into<String>) -> Self {
        Self::Characters(text.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start { name, .. } => write!(f, "<{name}>"),
            Self::End { name } => write!(f, "</{name}>"),
            Self::Characters(text) => write!(f, "{text:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenSink
// ---------------------------------------------------------------------------

/// Receives the tokens an item emits when it is written.
///
/// Writing can't fail at this level: sinks buffer in memory and the
/// stream driver deals with I/O errors when it flushes.
pub trait TokenSink {
    fn push(&mut self, token: Token);
}

impl TokenSink for Vec<Token> {
    fn push(&mut self, token: Token) {
        Vec::push(self, token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_insert_replaces_in_place() {
        let mut attrs = Attributes::new();
        attrs.insert("type", "say");
        attrs.insert("game_id", "3");
        attrs.insert("type", "shuffle");

        let pairs: Vec<_> = attrs.iter().collect();
        assert_eq!(pairs, vec![("type", "shuffle"), ("game_id", "3")]);
    }

    #[test]
    fn test_sub_type_defaults_to_empty() {
        assert_eq!(Attributes::new().sub_type(), "");

        let attrs: Attributes = [("type", "move_card")].into_iter().collect();
        assert_eq!(attrs.sub_type(), "move_card");
    }

    #[test]
    fn test_remove_returns_value() {
        let mut attrs: Attributes =
            [("cmd_id", "9"), ("type", "ping")].into_iter().collect();
        assert_eq!(attrs.remove("cmd_id").as_deref(), Some("9"));
        assert_eq!(attrs.remove("cmd_id"), None);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::start("x").to_string(), "<x>");
        assert_eq!(Token::end("x").to_string(), "</x>");
        assert_eq!(Token::characters("hi").to_string(), "\"hi\"");
    }

    #[test]
    fn test_vec_is_a_sink() {
        let mut sink: Vec<Token> = Vec::new();
        TokenSink::push(&mut sink, Token::end("a"));
        assert_eq!(sink, vec![Token::end("a")]);
    }
}
