//! Record reconstruction from token events.
//!
//! [`RecordReconstructor`] watches the event stream of one page file and
//! rebuilds the text of exactly one record at a time. A record is an object
//! element of a record array, which is either the top-level array or an array
//! member of a top-level envelope object. Anything outside a record array is
//! skipped, as are non-object elements of a record array.

use super::error::{ParseError, ParseResult};
use super::reader::Event;

/// What the reconstructor produced for one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Emit {
    /// Nothing to report yet.
    Nothing,
    /// A record array opened.
    ArrayStart,
    /// One complete record as standalone JSON text.
    Record(String),
    /// The current record array closed.
    ArrayEnd,
}

/// Reconstructor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not inside a record array (before the document, or in an envelope).
    Outside,
    /// Inside a record array, between elements.
    InArray,
    /// Capturing a record.
    InRecord,
    /// Ignoring a nested value until its container closes.
    Skipping {
        /// State to resume once the skipped value closes.
        resume: Resume,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    Outside,
    InArray,
}

/// Finite-state driver that turns events into record texts.
///
/// `depth` is the number of open containers. The depth of the open record
/// array is remembered so the record and array boundaries can be recognised
/// on close.
#[derive(Debug)]
pub struct RecordReconstructor {
    state: State,
    depth: usize,
    array_depth: usize,
    skip_depth: usize,
    text: String,
    needs_comma: bool,
    seen_root: bool,
}

impl Default for RecordReconstructor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReconstructor {
    pub fn new() -> Self {
        Self {
            state: State::Outside,
            depth: 0,
            array_depth: 0,
            skip_depth: 0,
            text: String::new(),
            needs_comma: false,
            seen_root: false,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Feed one event.
    pub fn feed(&mut self, event: Event) -> ParseResult<Emit> {
        match self.state {
            State::Outside => self.feed_outside(event),
            State::InArray => Ok(self.feed_in_array(event)),
            State::InRecord => Ok(self.feed_in_record(event)),
            State::Skipping { resume } => Ok(self.feed_skipping(event, resume)),
        }
    }

    fn feed_outside(&mut self, event: Event) -> ParseResult<Emit> {
        if self.depth == 0 {
            if self.seen_root {
                return Ok(Emit::Nothing);
            }
            self.seen_root = true;
            return match event {
                Event::StartArray => {
                    self.open_array();
                    Ok(Emit::ArrayStart)
                }
                Event::StartObject => {
                    self.depth = 1;
                    Ok(Emit::Nothing)
                }
                Event::String(_) => Err(ParseError::NotARecordArray { found: "a string" }),
                Event::Number(_) => Err(ParseError::NotARecordArray { found: "a number" }),
                Event::Bool(_) => Err(ParseError::NotARecordArray { found: "a boolean" }),
                Event::Null => Err(ParseError::NotARecordArray { found: "null" }),
                Event::EndObject | Event::EndArray | Event::Key(_) => {
                    Err(ParseError::NotARecordArray {
                        found: "a closing token",
                    })
                }
            };
        }

        // Inside the envelope object.
        match event {
            Event::StartArray => {
                self.open_array();
                Ok(Emit::ArrayStart)
            }
            Event::StartObject => {
                self.start_skip(Resume::Outside);
                Ok(Emit::Nothing)
            }
            Event::EndObject => {
                self.depth -= 1;
                Ok(Emit::Nothing)
            }
            _ => Ok(Emit::Nothing),
        }
    }

    fn feed_in_array(&mut self, event: Event) -> Emit {
        match event {
            Event::StartObject => {
                self.depth += 1;
                self.state = State::InRecord;
                self.text.clear();
                self.text.push('{');
                self.needs_comma = false;
                Emit::Nothing
            }
            Event::StartArray => {
                self.start_skip(Resume::InArray);
                Emit::Nothing
            }
            Event::EndArray => {
                self.depth -= 1;
                self.state = State::Outside;
                Emit::ArrayEnd
            }
            // Scalar elements are not records.
            _ => Emit::Nothing,
        }
    }

    fn feed_in_record(&mut self, event: Event) -> Emit {
        match event {
            Event::StartObject => {
                self.value_prefix();
                self.text.push('{');
                self.depth += 1;
                self.needs_comma = false;
            }
            Event::StartArray => {
                self.value_prefix();
                self.text.push('[');
                self.depth += 1;
                self.needs_comma = false;
            }
            Event::EndObject => {
                self.text.push('}');
                self.depth -= 1;
                self.needs_comma = true;
                if self.depth == self.array_depth {
                    self.state = State::InArray;
                    return Emit::Record(std::mem::take(&mut self.text));
                }
            }
            Event::EndArray => {
                self.text.push(']');
                self.depth -= 1;
                self.needs_comma = true;
            }
            Event::Key(key) => {
                if self.needs_comma {
                    self.text.push(',');
                }
                write_json_string(&mut self.text, &key);
                self.text.push(':');
                self.needs_comma = false;
            }
            Event::String(s) => {
                self.value_prefix();
                write_json_string(&mut self.text, &s);
                self.needs_comma = true;
            }
            Event::Number(n) => {
                self.value_prefix();
                self.text.push_str(&n);
                self.needs_comma = true;
            }
            Event::Bool(b) => {
                self.value_prefix();
                self.text.push_str(if b { "true" } else { "false" });
                self.needs_comma = true;
            }
            Event::Null => {
                self.value_prefix();
                self.text.push_str("null");
                self.needs_comma = true;
            }
        }
        Emit::Nothing
    }

    fn feed_skipping(&mut self, event: Event, resume: Resume) -> Emit {
        match event {
            Event::StartObject | Event::StartArray => self.depth += 1,
            Event::EndObject | Event::EndArray => {
                self.depth -= 1;
                if self.depth < self.skip_depth {
                    self.state = match resume {
                        Resume::Outside => State::Outside,
                        Resume::InArray => State::InArray,
                    };
                }
            }
            _ => {}
        }
        Emit::Nothing
    }

    fn open_array(&mut self) {
        self.depth += 1;
        self.array_depth = self.depth;
        self.state = State::InArray;
    }

    fn start_skip(&mut self, resume: Resume) {
        self.depth += 1;
        self.skip_depth = self.depth;
        self.state = State::Skipping { resume };
    }

    /// Separator before a value inside an array; values after a key never
    /// need one because the key already wrote it.
    fn value_prefix(&mut self) {
        if self.needs_comma {
            self.text.push(',');
        }
    }
}

/// Write `s` as a JSON string literal, escaping quotes, backslashes and
/// control characters (`\uXXXX` for those without a short form).
pub fn write_json_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
