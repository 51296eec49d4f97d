//! SQL generation module.
//!
//! This module provides a type-safe SQL builder for the statements the stager
//! emits. It includes:
//!
//! - [`ddl`] - Data Definition Language (CREATE TABLE, ALTER TABLE, CREATE INDEX, COMMENT, GRANT)
//! - [`dml`] - Data Manipulation Language (INSERT ... VALUES)
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations
//! - [`types`] - Column types of staged tables

pub mod ddl;
pub mod dialect;
pub mod dml;
pub mod token;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use token::{Token, TokenStream};
pub use types::ColumnType;

// Re-export DDL types
pub use ddl::{
    AlterAction, AlterTable, ColumnDef, CommentOnTable, CreateIndex, CreateTable, DataType,
    DdlStatement, Grant,
};

// Re-export DML types
pub use dml::{Insert, Row, SqlValue};
