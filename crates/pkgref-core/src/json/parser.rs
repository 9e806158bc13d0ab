//! Ranged JSON builder.
//!
//! Turns raw manifest text into a [`JsonDocument`] whose nodes remember
//! the byte ranges of their keys and values. Containers are tracked on an
//! explicit stack, so deeply nested input cannot overflow the call stack.

use super::ast::{CodeRange, JsonDocument, Node, NodeId, NodeKind, Scalar};
use std::fmt;
use thiserror::Error;

/// Produces a ranged document from raw text.
pub trait JsonParser: Send + Sync + fmt::Debug {
    /// Parse `text` into a document.
    ///
    /// # Errors
    /// Returns an error if `text` is not a single well-formed JSON value.
    fn parse(&self, text: &str) -> Result<JsonDocument, ParseError>;
}

/// What went wrong while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedEof,
    UnexpectedChar,
    InvalidEscape,
    InvalidNumber,
    ControlCharacter,
    TrailingContent,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UnexpectedEof => "unexpected end of input",
            Self::UnexpectedChar => "unexpected character",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidNumber => "invalid number",
            Self::ControlCharacter => "control character in string",
            Self::TrailingContent => "trailing content after document",
        };
        write!(f, "{s}")
    }
}

/// Malformed document error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at byte {offset}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset where the problem was detected.
    pub offset: usize,
}

impl ParseError {
    fn new(kind: ParseErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Strict JSON (RFC 8259) parser recording key and value ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangedJsonParser;

impl JsonParser for RangedJsonParser {
    fn parse(&self, text: &str) -> Result<JsonDocument, ParseError> {
        Builder::new(text).run()
    }
}

/// An open object or array.
struct Frame {
    id: NodeId,
    object: bool,
    has_items: bool,
    after_comma: bool,
}

struct Builder<'a> {
    text: &'a str,
    src: &'a [u8],
    pos: usize,
    doc: JsonDocument,
    stack: Vec<Frame>,
}

impl<'a> Builder<'a> {
    fn new(text: &'a str) -> Self {
        // Rough guess: one node per ~12 bytes of typical manifest text.
        let capacity = (text.len() / 12).max(8);
        Self {
            text,
            src: text.as_bytes(),
            pos: 0,
            doc: JsonDocument::with_capacity(capacity),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Result<JsonDocument, ParseError> {
        // Tolerate a UTF-8 byte order mark.
        if self.text.starts_with('\u{feff}') {
            self.pos = '\u{feff}'.len_utf8();
        }

        self.skip_whitespace();
        self.value(None, None)?;

        while let Some(top) = self.stack.last() {
            let (id, object, has_items, after_comma) =
                (top.id, top.object, top.has_items, top.after_comma);
            let close = if object { b'}' } else { b']' };

            self.skip_whitespace();
            let ch = self.peek()?;

            if ch == close {
                if after_comma {
                    return Err(self.error(ParseErrorKind::UnexpectedChar));
                }
                self.pos += 1;
                self.doc.close(id, self.pos);
                self.stack.pop();
                continue;
            }

            if has_items && !after_comma {
                self.expect(b',')?;
                if let Some(top) = self.stack.last_mut() {
                    top.after_comma = true;
                }
                continue;
            }

            if let Some(top) = self.stack.last_mut() {
                top.has_items = true;
                top.after_comma = false;
            }

            if object {
                if ch != b'"' {
                    return Err(self.error(ParseErrorKind::UnexpectedChar));
                }
                let (key, key_range) = self.string()?;
                self.skip_whitespace();
                self.expect(b':')?;
                self.skip_whitespace();
                self.value(Some(id), Some((key, key_range)))?;
            } else {
                self.value(Some(id), None)?;
            }
        }

        self.skip_whitespace();
        if self.pos < self.src.len() {
            return Err(self.error(ParseErrorKind::TrailingContent));
        }

        Ok(self.doc)
    }

    /// Parse one value. Containers are opened and left on the stack.
    fn value(
        &mut self,
        parent: Option<NodeId>,
        key: Option<(String, CodeRange)>,
    ) -> Result<(), ParseError> {
        let (key, key_range) = match key {
            Some((k, r)) => (Some(k), Some(r)),
            None => (None, None),
        };
        let start = self.pos;

        let (kind, value_range) = match self.peek()? {
            b'{' | b'[' => {
                let object = self.src[start] == b'{';
                self.pos += 1;
                let kind = if object {
                    NodeKind::Object(Vec::new())
                } else {
                    NodeKind::Array(Vec::new())
                };
                let id = self.doc.push(Node {
                    kind,
                    key,
                    key_range,
                    value_range: CodeRange::new(start, self.pos),
                    parent,
                });
                self.stack.push(Frame {
                    id,
                    object,
                    has_items: false,
                    after_comma: false,
                });
                return Ok(());
            }
            b'"' => {
                let (s, range) = self.string()?;
                (NodeKind::Scalar(Scalar::String(s)), range)
            }
            b'-' | b'0'..=b'9' => {
                let lexeme = self.number()?;
                (
                    NodeKind::Scalar(Scalar::Number(lexeme.to_string())),
                    CodeRange::new(start, self.pos),
                )
            }
            b't' => {
                self.literal("true")?;
                (NodeKind::Scalar(Scalar::Bool(true)), CodeRange::new(start, self.pos))
            }
            b'f' => {
                self.literal("false")?;
                (NodeKind::Scalar(Scalar::Bool(false)), CodeRange::new(start, self.pos))
            }
            b'n' => {
                self.literal("null")?;
                (NodeKind::Scalar(Scalar::Null), CodeRange::new(start, self.pos))
            }
            _ => return Err(self.error(ParseErrorKind::UnexpectedChar)),
        };

        self.doc.push(Node {
            kind,
            key,
            key_range,
            value_range,
            parent,
        });
        Ok(())
    }

    /// Scan a string starting at the opening quote.
    ///
    /// Returns the decoded contents and the range between the quotes.
    fn string(&mut self) -> Result<(String, CodeRange), ParseError> {
        self.expect(b'"')?;
        let start = self.pos;
        let mut out = String::new();
        let mut run_start = self.pos;

        loop {
            let Some(&byte) = self.src.get(self.pos) else {
                return Err(self.error(ParseErrorKind::UnexpectedEof));
            };
            match byte {
                b'"' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    let range = CodeRange::new(start, self.pos);
                    self.pos += 1;
                    return Ok((out, range));
                }
                b'\\' => {
                    out.push_str(&self.text[run_start..self.pos]);
                    self.pos += 1;
                    self.escape(&mut out)?;
                    run_start = self.pos;
                }
                0x00..=0x1f => return Err(self.error(ParseErrorKind::ControlCharacter)),
                _ => self.pos += 1,
            }
        }
    }

    /// Decode one escape sequence; `pos` is just past the backslash.
    fn escape(&mut self, out: &mut String) -> Result<(), ParseError> {
        let ch = self.peek()?;
        self.pos += 1;
        let decoded = match ch {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let high = self.hex4()?;
                if (0xD800..0xDC00).contains(&high) {
                    // Surrogate pair: must be followed by \uDC00-\uDFFF.
                    if self.src.get(self.pos) == Some(&b'\\')
                        && self.src.get(self.pos + 1) == Some(&b'u')
                    {
                        self.pos += 2;
                        let low = self.hex4()?;
                        if !(0xDC00..0xE000).contains(&low) {
                            return Err(self.error(ParseErrorKind::InvalidEscape));
                        }
                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        char::from_u32(code)
                            .ok_or_else(|| self.error(ParseErrorKind::InvalidEscape))?
                    } else {
                        char::REPLACEMENT_CHARACTER
                    }
                } else {
                    char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER)
                }
            }
            _ => return Err(ParseError::new(ParseErrorKind::InvalidEscape, self.pos - 1)),
        };
        out.push(decoded);
        Ok(())
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let digits = self
            .text
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEof))?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.error(ParseErrorKind::InvalidEscape));
        }
        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| self.error(ParseErrorKind::InvalidEscape))?;
        self.pos += 4;
        Ok(value)
    }

    /// Scan `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
    fn number(&mut self) -> Result<&'a str, ParseError> {
        let text = self.text;
        let start = self.pos;
        if self.src.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }

        match self.src.get(self.pos) {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.error(ParseErrorKind::InvalidNumber)),
        }

        if self.src.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            if !self.src.get(self.pos).is_some_and(u8::is_ascii_digit) {
                return Err(self.error(ParseErrorKind::InvalidNumber));
            }
            self.digits();
        }

        if matches!(self.src.get(self.pos), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.src.get(self.pos), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.src.get(self.pos).is_some_and(u8::is_ascii_digit) {
                return Err(self.error(ParseErrorKind::InvalidNumber));
            }
            self.digits();
        }

        Ok(&text[start..self.pos])
    }

    fn digits(&mut self) {
        while self.src.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
    }

    fn literal(&mut self, word: &str) -> Result<(), ParseError> {
        if self.src[self.pos..].starts_with(word.as_bytes()) {
            self.pos += word.len();
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::UnexpectedChar))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.src.get(self.pos), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Result<u8, ParseError> {
        self.src
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.error(ParseErrorKind::UnexpectedEof))
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.peek()? == byte {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(ParseErrorKind::UnexpectedChar))
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.pos)
    }
}
