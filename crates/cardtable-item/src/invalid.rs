//! Placeholder for elements no factory is registered for.
//!
//! A newer peer may send element types this build has never heard of.
//! Instead of failing, the parent parks an [`InvalidItem`] in its repeated
//! children. The placeholder walks the unknown subtree (so the parent
//! knows where it ends) and throws the content away.

use crate::{ItemError, Progress, Token};

/// An unrecognized element, read structurally and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidItem {
    item_type: String,
    /// The `type` attribute of the element's own start tag, kept for
    /// diagnostics.
    sub_type: String,
    /// Names of the elements currently open inside the subtree, outermost
    /// first. Empty before the first token and after the last.
    open: Vec<String>,
    closed: bool,
}

impl InvalidItem {
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            sub_type: String::new(),
            open: Vec::new(),
            closed: false,
        }
    }

    pub fn item_type(&self) -> &str {
        &self.item_type
    }

    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Consumes one token of the unknown subtree.
    ///
    /// # Errors
    /// End tags must still pair up with start tags; a mismatch is reported
    /// exactly as it would be for a known element.
    pub fn feed(&mut self, token: &Token) -> Result<Progress, ItemError> {
        if self.closed {
            return Err(ItemError::AlreadyClosed(self.item_type.clone()));
        }

        match token {
            Token::Start { name, attributes } => {
                if self.open.is_empty() {
                    self.sub_type = attributes.sub_type().to_string();
                }
                self.open.push(name.clone());
                Ok(Progress::Pending)
            }
            Token::End { name } => {
                let expected = self
                    .open
                    .pop()
                    .unwrap_or_else(|| self.item_type.clone());
                if expected != *name {
                    return Err(ItemError::UnexpectedEnd {
                        expected,
                        found: name.clone(),
                    });
                }
                if self.open.is_empty() {
                    self.closed = true;
                    return Ok(Progress::Complete);
                }
                Ok(Progress::Pending)
            }
            Token::Characters(_) => Ok(Progress::Pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumes_nested_subtree() {
        let mut item = InvalidItem::new("foo");
        let tokens = [
            Token::start("foo"),
            Token::start("bar"),
            Token::start("foo"),
            Token::characters("x"),
            Token::end("foo"),
            Token::end("bar"),
        ];
        for token in &tokens {
            assert_eq!(item.feed(token).unwrap(), Progress::Pending);
        }
        assert_eq!(item.feed(&Token::end("foo")).unwrap(), Progress::Complete);
        assert!(item.is_closed());
    }

    #[test]
    fn test_mismatched_end_is_reported() {
        let mut item = InvalidItem::new("foo");
        item.feed(&Token::start("foo")).unwrap();
        item.feed(&Token::start("bar")).unwrap();
        assert_eq!(
            item.feed(&Token::end("foo")),
            Err(ItemError::UnexpectedEnd {
                expected: "bar".into(),
                found: "foo".into(),
            })
        );
    }

    #[test]
    fn test_rejects_tokens_after_close() {
        let mut item = InvalidItem::new("foo");
        item.feed(&Token::start("foo")).unwrap();
        item.feed(&Token::end("foo")).unwrap();
        assert!(matches!(
            item.feed(&Token::start("foo")),
            Err(ItemError::AlreadyClosed(_))
        ));
    }

    #[test]
    fn test_remembers_sub_type_of_own_tag() {
        let mut item = InvalidItem::new("command");
        item.feed(&Token::start_with_sub_type("command", "teleport")).unwrap();
        item.feed(&Token::start_with_sub_type("target", "zone")).unwrap();
        assert_eq!(item.sub_type(), "teleport");
    }
}
