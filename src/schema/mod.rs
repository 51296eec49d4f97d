//! Source table schemas and their inference from data.
//!
//! - [`table`] - `TableSchema`, `ColumnSchema` and naming rules
//! - [`catalog`] - known source tables
//! - [`stats`] - per-field type statistics
//! - [`inference`] - column type selection

pub mod catalog;
pub mod inference;
pub mod stats;
pub mod table;

use thiserror::Error;

pub use catalog::{Catalog, CatalogEntry};
pub use inference::{infer_columns, select_column_type};
pub use stats::{Counts, FieldStats};
pub use table::{ColumnSchema, TableSchema};

/// Errors that stop a table's schema from being inferred.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaError {
    /// A field holds more than one kind of non-null value.
    #[error("inconsistent types in field '{field}': {counts:?}")]
    InconsistentTypes { field: String, counts: Counts },

    /// Two fields map to the same destination column.
    #[error("column '{column}' derived from both '{first}' and '{second}'")]
    ColumnCollision {
        column: String,
        first: String,
        second: String,
    },
}

pub type SchemaResult<T> = Result<T, SchemaError>;
