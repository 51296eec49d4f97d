//! Staging error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::json::ParseError;
use crate::schema::SchemaError;
use crate::sql::types::ColumnType;

/// Result type for SQL execution.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors raised by a [`SqlExecutor`](super::exec::SqlExecutor).
#[derive(Debug, Error)]
pub enum ExecError {
    /// Failed to write a statement to its destination.
    #[error("failed to write statement: {0}")]
    Io(#[from] io::Error),

    /// The backend rejected a statement.
    #[error("statement failed: {message}")]
    Failed { message: String },
}

impl ExecError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Result type for staging operations.
pub type StageResult<T> = Result<T, StageError>;

/// Errors that abort the staging of one table.
#[derive(Debug, Error)]
pub enum StageError {
    /// A page file could not be parsed.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The page-count file exists but could not be read.
    #[error("unable to read page count from {}: {message}", path.display())]
    PageCount { path: PathBuf, message: String },

    /// Schema inference could not resolve a field.
    #[error("schema inference failed for table '{table}': {source}")]
    Schema {
        table: String,
        #[source]
        source: SchemaError,
    },

    /// A record has no string identifier.
    #[error("record in table '{table}' has no string \"id\" field")]
    MissingId { table: String },

    /// A record identifier too long to store.
    #[error("record in table '{table}' has an identifier too long to store: {id}")]
    OversizedId { table: String, id: String },

    /// A value does not match the type inferred for its column.
    #[error("value of column '{column}' in table '{table}' (id {id}) is {found}, expected {expected}")]
    TypeMismatch {
        table: String,
        column: String,
        id: String,
        expected: ColumnType,
        found: &'static str,
    },

    /// A statement failed.
    #[error("SQL execution failed: {0}")]
    Exec(#[from] ExecError),
}
