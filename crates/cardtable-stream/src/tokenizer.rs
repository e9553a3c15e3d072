//! Incremental markup tokenizer.
//!
//! Bytes arrive in arbitrary chunks; the tokenizer buffers them and hands
//! out complete [`Token`]s one at a time. A token is only produced once
//! everything it spans has arrived, so callers never see half a tag.
//!
//! A run of character data, entity references included, becomes one
//! `Characters` token once the `<` ending it has arrived. CDATA sections
//! are separate tokens, so items still have to cope with a text node
//! arriving in more than one piece.

use cardtable_item::{Attributes, Token};

use crate::StreamError;

/// Longest entity name we wait for before deciding the `&` is garbage.
const MAX_ENTITY_LEN: usize = 12;

/// Splits buffered markup text into tokens.
#[derive(Debug)]
pub struct Tokenizer {
    buf: String,
    pos: usize,
    /// Trailing bytes of a UTF-8 sequence cut off by the last chunk.
    utf8_tail: Vec<u8>,
    /// End tag owed for a self-closing element.
    pending_end: Option<String>,
    max_buffer_len: usize,
}

/// What the scanner found at the current position.
enum Step {
    /// The buffer ends before the construct does.
    NeedMore,
    /// Discard this many bytes (comments, processing instructions).
    Skip(usize),
    /// Consume this many bytes and hand out `token`.
    Emit {
        consumed: usize,
        token: Token,
        then_end: Option<String>,
    },
}

impl Tokenizer {
    /// Creates a tokenizer that refuses to buffer an incomplete token
    /// longer than `max_buffer_len` bytes.
    pub fn new(max_buffer_len: usize) -> Self {
        Self {
            buf: String::new(),
            pos: 0,
            utf8_tail: Vec::new(),
            pending_end: None,
            max_buffer_len,
        }
    }

    /// Appends text to the buffer.
    pub fn push_str(&mut self, text: &str) {
        if self.pos > 0 {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
        self.buf.push_str(text);
    }

    /// Appends raw bytes. A multi-byte character split across two chunks
    /// is held back until its remaining bytes arrive.
    ///
    /// # Errors
    /// Returns [`StreamError::Malformed`] on bytes that can never become
    /// valid UTF-8.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        let mut data = std::mem::take(&mut self.utf8_tail);
        data.extend_from_slice(bytes);

        match std::str::from_utf8(&data) {
            Ok(text) => {
                self.push_str(text);
                Ok(())
            }
            Err(e) if e.error_len().is_none() => {
                let (valid, tail) = data.split_at(e.valid_up_to());
                let text = std::str::from_utf8(valid)
                    .map_err(|e| StreamError::Malformed(e.to_string()))?;
                self.push_str(text);
                self.utf8_tail = tail.to_vec();
                Ok(())
            }
            Err(e) => Err(StreamError::Malformed(format!("invalid UTF-8: {e}"))),
        }
    }

    /// True when something other than whitespace is waiting in the
    /// buffer.
    pub fn has_pending_input(&self) -> bool {
        self.pending_end.is_some()
            || !self.utf8_tail.is_empty()
            || !self.buf[self.pos..].trim().is_empty()
    }

    /// Returns the next complete token, or `None` when more input is
    /// needed.
    ///
    /// # Errors
    /// Fails on malformed markup, unknown entities, and incomplete tokens
    /// longer than the buffer limit.
    pub fn next_token(&mut self) -> Result<Option<Token>, StreamError> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(Token::End { name }));
        }

        loop {
            let rest = &self.buf[self.pos..];
            if rest.is_empty() {
                return Ok(None);
            }

            let step = if rest.starts_with('<') {
                scan_markup(rest)?
            } else {
                scan_text(rest)?
            };

            match step {
                Step::NeedMore => return self.need_more(),
                Step::Skip(len) => self.pos += len,
                Step::Emit {
                    consumed,
                    token,
                    then_end,
                } => {
                    self.pos += consumed;
                    self.pending_end = then_end;
                    return Ok(Some(token));
                }
            }
        }
    }

    fn need_more(&self) -> Result<Option<Token>, StreamError> {
        if self.buf.len() - self.pos > self.max_buffer_len {
            return Err(StreamError::BufferOverflow {
                limit: self.max_buffer_len,
            });
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Scanners
// ---------------------------------------------------------------------------

/// Scans a run of text and entity references up to the next `<`.
fn scan_text(rest: &str) -> Result<Step, StreamError> {
    let mut text = String::new();
    let mut pos = 0;
    loop {
        let run = &rest[pos..];
        let Some(stop) = run.find(['<', '&']) else {
            return Ok(Step::NeedMore);
        };
        text.push_str(&run[..stop]);
        pos += stop;

        if rest[pos..].starts_with('<') {
            return Ok(Step::Emit {
                consumed: pos,
                token: Token::Characters(text),
                then_end: None,
            });
        }
        match scan_entity(&rest[pos..])? {
            Some((len, c)) => {
                text.push(c);
                pos += len;
            }
            None => return Ok(Step::NeedMore),
        }
    }
}

/// Resolves the entity reference at the start of `rest`, returning its
/// length and character, or `None` if the `;` hasn't arrived yet.
fn scan_entity(rest: &str) -> Result<Option<(usize, char)>, StreamError> {
    let semi = rest
        .char_indices()
        .take(MAX_ENTITY_LEN + 2)
        .find(|&(_, c)| c == ';')
        .map(|(index, _)| index);

    match semi {
        Some(semi) => Ok(Some((semi + 1, resolve_entity(&rest[1..semi])?))),
        None if rest.len() > MAX_ENTITY_LEN + 1 => {
            Err(StreamError::Malformed("unterminated entity reference".into()))
        }
        None => Ok(None),
    }
}

fn scan_markup(rest: &str) -> Result<Step, StreamError> {
    const COMMENT: &str = "<!--";
    const CDATA: &str = "<![CDATA[";

    if rest.starts_with("<?") {
        return Ok(skip_past(rest, "?>"));
    }
    if rest.starts_with(COMMENT) {
        return Ok(skip_past(rest, "-->"));
    }
    if let Some(body) = rest.strip_prefix(CDATA) {
        return Ok(match body.find("]]>") {
            Some(end) => Step::Emit {
                consumed: CDATA.len() + end + 3,
                token: Token::Characters(body[..end].to_string()),
                then_end: None,
            },
            None => Step::NeedMore,
        });
    }
    if rest.starts_with("<!") {
        if COMMENT.starts_with(rest) || CDATA.starts_with(rest) {
            return Ok(Step::NeedMore);
        }
        // A doctype declaration. Nothing in it matters to us.
        return Ok(skip_past(rest, ">"));
    }

    let Some(end) = find_tag_end(rest) else {
        return Ok(Step::NeedMore);
    };
    let (token, then_end) = parse_tag(&rest[1..end])?;
    Ok(Step::Emit {
        consumed: end + 1,
        token,
        then_end,
    })
}

fn skip_past(rest: &str, terminator: &str) -> Step {
    match rest.find(terminator) {
        Some(index) => Step::Skip(index + terminator.len()),
        None => Step::NeedMore,
    }
}

/// Index of the `>` closing the tag at the start of `rest`, ignoring any
/// `>` inside quoted attribute values.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (index, c) in rest.char_indices().skip(1) {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), _) if c == open => quote = None,
            (None, '>') => return Some(index),
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Parses the text between `<` and `>`. The second value is the name of
/// an element that closed itself (`<name/>`).
fn parse_tag(tag: &str) -> Result<(Token, Option<String>), StreamError> {
    if let Some(name) = tag.strip_prefix('/') {
        let name = name.trim_end();
        check_name(name)?;
        return Ok((Token::end(name), None));
    }

    let (body, self_closing) = match tag.strip_suffix('/') {
        Some(body) => (body, true),
        None => (tag, false),
    };
    let name_end = body.find(char::is_whitespace).unwrap_or(body.len());
    let name = &body[..name_end];
    check_name(name)?;

    let token = Token::Start {
        name: name.to_string(),
        attributes: parse_attributes(&body[name_end..])?,
    };
    Ok((token, self_closing.then(|| name.to_string())))
}

fn parse_attributes(mut rest: &str) -> Result<Attributes, StreamError> {
    let mut attributes = Attributes::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(attributes);
        }

        let eq = rest
            .find('=')
            .ok_or_else(|| StreamError::Malformed(format!("attribute without value: {rest:?}")))?;
        let key = rest[..eq].trim_end();
        check_name(key)?;

        let after = rest[eq + 1..].trim_start();
        let quote = after
            .chars()
            .next()
            .filter(|c| matches!(c, '"' | '\''))
            .ok_or_else(|| StreamError::Malformed(format!("unquoted value for {key:?}")))?;
        let len = after[1..]
            .find(quote)
            .ok_or_else(|| StreamError::Malformed(format!("unterminated value for {key:?}")))?;

        attributes.insert(key, unescape(&after[1..1 + len])?);
        rest = &after[len + 2..];
    }
}

fn check_name(name: &str) -> Result<(), StreamError> {
    let bad = name.is_empty()
        || name.contains(|c: char| {
            c.is_whitespace() || matches!(c, '<' | '>' | '&' | '"' | '\'' | '=' | '/')
        });
    if bad {
        return Err(StreamError::Malformed(format!("bad name {name:?}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

fn resolve_entity(name: &str) -> Result<char, StreamError> {
    let c = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(decimal) = name.strip_prefix('#') {
                decimal.parse().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
        }
    };
    c.ok_or_else(|| StreamError::UnknownEntity(name.to_string()))
}

/// Resolves every entity in an attribute value.
fn unescape(raw: &str) -> Result<String, StreamError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| StreamError::Malformed("unterminated entity in attribute".into()))?;
        out.push(resolve_entity(&after[..semi])?);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
