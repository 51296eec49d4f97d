//! Forward-only JSON tokenizer.
//!
//! [`Reader`] pulls bytes from a [`BufRead`] and yields one [`Event`] at a
//! time without building a tree, so a page file of any size is read in
//! constant memory. Structure is validated as it streams: a mismatched
//! bracket or a missing colon is reported with its position. Trailing commas
//! before `]` or `}` are accepted, matching what the extraction stage may
//! write.

use std::io::BufRead;

use super::error::{ParseError, ParseResult, Position};

/// A single token-level event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    /// An object member name, unescaped.
    Key(String),
    /// A string value, unescaped.
    String(String),
    /// A number value, as its literal text.
    Number(String),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the grammar allows next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// The single top-level value.
    Root,
    /// A value, or `]` to close an array.
    ValueOrEnd,
    /// A value after a member name.
    MemberValue,
    /// A member name, or `}` to close an object.
    KeyOrEnd,
    /// `:` after a member name.
    Colon,
    /// `,` or the closing bracket of the current container.
    CommaOrEnd,
    /// The top-level value is complete; only whitespace may follow.
    Done,
}

/// Pull tokenizer over a buffered byte source.
pub struct Reader<R> {
    src: R,
    pos: Position,
    stack: Vec<Container>,
    expect: Expect,
}

impl<R: BufRead> Reader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            pos: Position::start(),
            stack: Vec::new(),
            expect: Expect::Root,
        }
    }

    /// Current position in the input.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Current container nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Next event, or `None` once the top-level value is complete and only
    /// whitespace remains.
    pub fn next_event(&mut self) -> ParseResult<Option<Event>> {
        loop {
            self.skip_whitespace()?;
            let Some(b) = self.peek()? else {
                return if self.expect == Expect::Done {
                    Ok(None)
                } else {
                    Err(ParseError::UnexpectedEof { position: self.pos })
                };
            };

            match self.expect {
                Expect::Done => {
                    return Err(ParseError::syntax(
                        "trailing characters after top-level value",
                        self.pos,
                    ));
                }
                Expect::Colon => {
                    if b != b':' {
                        return Err(ParseError::syntax("expected ':'", self.pos));
                    }
                    self.bump();
                    self.expect = Expect::MemberValue;
                    continue;
                }
                Expect::CommaOrEnd => match b {
                    b',' => {
                        self.bump();
                        self.expect = match self.stack.last() {
                            Some(Container::Object) => Expect::KeyOrEnd,
                            _ => Expect::ValueOrEnd,
                        };
                        continue;
                    }
                    b']' | b'}' => return self.close(b).map(Some),
                    _ => return Err(ParseError::syntax("expected ',' or closing bracket", self.pos)),
                },
                Expect::KeyOrEnd => match b {
                    b'"' => {
                        let start = self.pos;
                        self.bump();
                        let key = self.read_string(start)?;
                        self.expect = Expect::Colon;
                        return Ok(Some(Event::Key(key)));
                    }
                    b'}' => return self.close(b).map(Some),
                    _ => return Err(ParseError::syntax("expected member name or '}'", self.pos)),
                },
                Expect::ValueOrEnd if b == b']' => return self.close(b).map(Some),
                Expect::Root | Expect::ValueOrEnd | Expect::MemberValue => {
                    return self.read_value(b).map(Some);
                }
            }
        }
    }

    // =========================================================================
    // Values
    // =========================================================================

    fn read_value(&mut self, b: u8) -> ParseResult<Event> {
        let start = self.pos;
        let event = match b {
            b'{' => {
                self.bump();
                self.stack.push(Container::Object);
                self.expect = Expect::KeyOrEnd;
                return Ok(Event::StartObject);
            }
            b'[' => {
                self.bump();
                self.stack.push(Container::Array);
                self.expect = Expect::ValueOrEnd;
                return Ok(Event::StartArray);
            }
            b'"' => {
                self.bump();
                Event::String(self.read_string(start)?)
            }
            b't' => {
                self.read_literal(b"true")?;
                Event::Bool(true)
            }
            b'f' => {
                self.read_literal(b"false")?;
                Event::Bool(false)
            }
            b'n' => {
                self.read_literal(b"null")?;
                Event::Null
            }
            b'-' | b'0'..=b'9' => Event::Number(self.read_number()?),
            _ => {
                return Err(ParseError::syntax(
                    format!("unexpected character '{}'", b as char),
                    start,
                ))
            }
        };
        self.after_value();
        Ok(event)
    }

    fn after_value(&mut self) {
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
    }

    fn close(&mut self, b: u8) -> ParseResult<Event> {
        let (want, event) = match b {
            b']' => (Container::Array, Event::EndArray),
            _ => (Container::Object, Event::EndObject),
        };
        if self.stack.last() != Some(&want) {
            return Err(ParseError::syntax(
                format!("unexpected '{}'", b as char),
                self.pos,
            ));
        }
        self.bump();
        self.stack.pop();
        self.after_value();
        Ok(event)
    }

    fn read_literal(&mut self, word: &'static [u8]) -> ParseResult<()> {
        let start = self.pos;
        for &expected in word {
            match self.peek()? {
                Some(b) if b == expected => self.bump(),
                _ => {
                    return Err(ParseError::syntax(
                        format!("invalid literal, expected '{}'", String::from_utf8_lossy(word)),
                        start,
                    ))
                }
            }
        }
        Ok(())
    }

    fn read_number(&mut self) -> ParseResult<String> {
        let start = self.pos;
        let mut text = String::new();

        if self.peek()? == Some(b'-') {
            text.push('-');
            self.bump();
        }

        match self.peek()? {
            Some(b'0') => {
                text.push('0');
                self.bump();
            }
            Some(b'1'..=b'9') => self.read_digits(&mut text)?,
            _ => return Err(ParseError::syntax("invalid number", start)),
        }

        if self.peek()? == Some(b'.') {
            text.push('.');
            self.bump();
            if !matches!(self.peek()?, Some(b'0'..=b'9')) {
                return Err(ParseError::syntax("expected digit after '.'", self.pos));
            }
            self.read_digits(&mut text)?;
        }

        if let Some(e @ (b'e' | b'E')) = self.peek()? {
            text.push(e as char);
            self.bump();
            if let Some(sign @ (b'+' | b'-')) = self.peek()? {
                text.push(sign as char);
                self.bump();
            }
            if !matches!(self.peek()?, Some(b'0'..=b'9')) {
                return Err(ParseError::syntax("expected digit in exponent", self.pos));
            }
            self.read_digits(&mut text)?;
        }

        Ok(text)
    }

    fn read_digits(&mut self, text: &mut String) -> ParseResult<()> {
        while let Some(d @ b'0'..=b'9') = self.peek()? {
            text.push(d as char);
            self.bump();
        }
        Ok(())
    }

    /// Read a string body; the opening quote has been consumed.
    fn read_string(&mut self, start: Position) -> ParseResult<String> {
        let mut bytes = Vec::new();
        loop {
            let Some(b) = self.peek()? else {
                return Err(ParseError::UnexpectedEof { position: self.pos });
            };
            match b {
                b'"' => {
                    self.bump();
                    break;
                }
                b'\\' => {
                    self.bump();
                    self.read_escape(&mut bytes)?;
                }
                0x00..=0x1f => {
                    return Err(ParseError::syntax(
                        "unescaped control character in string",
                        self.pos,
                    ));
                }
                _ => {
                    bytes.push(b);
                    self.bump();
                }
            }
        }
        String::from_utf8(bytes).map_err(|_| ParseError::InvalidUtf8 { position: start })
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> ParseResult<()> {
        let at = self.pos;
        let Some(b) = self.peek()? else {
            return Err(ParseError::UnexpectedEof { position: self.pos });
        };
        self.bump();
        let simple = match b {
            b'"' => b'"',
            b'\\' => b'\\',
            b'/' => b'/',
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let c = self.read_unicode_escape(at)?;
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                return Ok(());
            }
            _ => return Err(ParseError::syntax("invalid escape sequence", at)),
        };
        out.push(simple);
        Ok(())
    }

    /// Decode `XXXX` (and a following `\uXXXX` low surrogate when needed).
    fn read_unicode_escape(&mut self, at: Position) -> ParseResult<char> {
        let first = self.read_hex4(at)?;
        let code = match first {
            0xD800..=0xDBFF => {
                if self.peek()? != Some(b'\\') {
                    return Err(ParseError::syntax("unpaired surrogate in \\u escape", at));
                }
                self.bump();
                if self.peek()? != Some(b'u') {
                    return Err(ParseError::syntax("unpaired surrogate in \\u escape", at));
                }
                self.bump();
                let second = self.read_hex4(at)?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(ParseError::syntax("invalid low surrogate in \\u escape", at));
                }
                0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(ParseError::syntax("unpaired surrogate in \\u escape", at));
            }
            other => other,
        };
        char::from_u32(code).ok_or_else(|| ParseError::syntax("invalid \\u escape", at))
    }

    fn read_hex4(&mut self, at: Position) -> ParseResult<u32> {
        let mut value = 0u32;
        for _ in 0..4 {
            let digit = match self.peek()? {
                Some(b) => (b as char).to_digit(16),
                None => None,
            };
            let Some(digit) = digit else {
                return Err(ParseError::syntax("invalid \\u escape", at));
            };
            self.bump();
            value = value * 16 + digit;
        }
        Ok(value)
    }

    // =========================================================================
    // Byte access
    // =========================================================================

    fn skip_whitespace(&mut self) -> ParseResult<()> {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek()? {
            self.bump();
        }
        Ok(())
    }

    fn peek(&mut self) -> ParseResult<Option<u8>> {
        let buf = self.src.fill_buf()?;
        Ok(buf.first().copied())
    }

    /// Consume the byte last returned by `peek`.
    fn bump(&mut self) {
        let newline = matches!(self.src.fill_buf(), Ok(buf) if buf.first() == Some(&b'\n'));
        self.src.consume(1);
        self.pos.offset += 1;
        if newline {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
    }
}
