//! JSON page parsing errors.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for page parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Location of a byte in the input, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Zero-based byte offset.
    pub offset: u64,
    /// One-based line.
    pub line: u64,
    /// One-based column, counted in bytes.
    pub column: u64,
}

impl Position {
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while streaming records out of a page file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read the underlying file or stream.
    #[error("failed to read JSON input: {0}")]
    Io(#[from] io::Error),

    /// The outer, token-level parse hit malformed JSON.
    #[error("JSON syntax error at {position}: {message}")]
    Syntax { message: String, position: Position },

    /// A string literal was not valid UTF-8.
    #[error("invalid UTF-8 in string at {position}")]
    InvalidUtf8 { position: Position },

    /// The document is a bare scalar rather than an array or envelope object.
    #[error("expected a JSON array of records or an object wrapping one, found {found}")]
    NotARecordArray { found: &'static str },

    /// Input ended before the top-level value was closed.
    #[error("unexpected end of JSON input at {position}")]
    UnexpectedEof { position: Position },

    /// A reconstructed record failed to parse as a standalone document.
    #[error("failed to parse record: {source}")]
    Record {
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>, position: Position) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
        }
    }
}
