//! Streaming access to the records of a JSON page file.
//!
//! A page is parsed twice: a forward-only token pass ([`reader`]) over the
//! whole file, and a sub-parse of each reconstructed record
//! ([`reconstruct`]) into a [`serde_json::Value`]. Only one record's text and
//! tree are alive at a time.
//!
//! ```ignore
//! use ldp_stage::json::{PageItem, RecordStream};
//!
//! for item in RecordStream::open("users_0.json")? {
//!     if let PageItem::Record(value) = item? {
//!         println!("{}", value["id"]);
//!     }
//! }
//! ```

pub mod error;
pub mod reader;
pub mod reconstruct;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

pub use error::{ParseError, ParseResult, Position};
pub use reader::{Event, Reader};
pub use reconstruct::{Emit, RecordReconstructor};

/// Read buffer used for page files.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// One item of a page, in file order.
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    /// A record array opened.
    ArrayStart,
    /// A parsed record.
    Record(Value),
    /// The current record array closed.
    ArrayEnd,
}

/// Iterator over the items of one page.
pub struct RecordStream<R> {
    reader: Reader<R>,
    reconstructor: RecordReconstructor,
    done: bool,
}

impl RecordStream<BufReader<File>> {
    /// Open a page file.
    pub fn open(path: impl AsRef<Path>) -> ParseResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}

impl<R: BufRead> RecordStream<R> {
    pub fn new(src: R) -> Self {
        Self {
            reader: Reader::new(src),
            reconstructor: RecordReconstructor::new(),
            done: false,
        }
    }

    /// Next item, or `None` at the end of the document.
    pub fn next_item(&mut self) -> ParseResult<Option<PageItem>> {
        if self.done {
            return Ok(None);
        }
        loop {
            let Some(event) = self.reader.next_event()? else {
                self.done = true;
                return Ok(None);
            };
            match self.reconstructor.feed(event)? {
                Emit::Nothing => continue,
                Emit::ArrayStart => return Ok(Some(PageItem::ArrayStart)),
                Emit::ArrayEnd => return Ok(Some(PageItem::ArrayEnd)),
                Emit::Record(text) => {
                    tracing::trace!(record = %text, "record parsed");
                    let value = serde_json::from_str(&text)
                        .map_err(|source| ParseError::Record { source })?;
                    return Ok(Some(PageItem::Record(value)));
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = ParseResult<PageItem>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_item() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                // A syntax error leaves the tokenizer mid-value; stop here.
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
