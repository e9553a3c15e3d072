//! Renders tokens as markup text.

use cardtable_item::{Token, TokenSink};

/// A [`TokenSink`] that appends escaped markup to an in-memory buffer.
///
/// The buffer is drained with [`take`](Self::take) after every top-level
/// item so the async writer can flush it.
#[derive(Debug, Default)]
pub struct MarkupWriter {
    out: String,
}

impl MarkupWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text rendered so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Removes and returns everything rendered so far.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.out)
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl TokenSink for MarkupWriter {
    fn push(&mut self, token: Token) {
        match token {
            Token::Start { name, attributes } => {
                self.out.push('<');
                self.out.push_str(&name);
                for (key, value) in attributes.iter() {
                    self.out.push(' ');
                    self.out.push_str(key);
                    self.out.push_str("=\"");
                    escape_into(&mut self.out, value, true);
                    self.out.push('"');
                }
                self.out.push('>');
            }
            Token::End { name } => {
                self.out.push_str("</");
                self.out.push_str(&name);
                self.out.push('>');
            }
            Token::Characters(text) => escape_into(&mut self.out, &text, false),
        }
    }
}

/// Appends `text` with markup-significant characters replaced by entities.
/// Quotes are only escaped inside attribute values.
fn escape_into(out: &mut String, text: &str, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
