//! Column types for staged tables.
//!
//! Staging tables use a deliberately small, closed set of column types. The
//! set is decided by schema inference from observed JSON values, then spelled
//! out for DDL here. Dialect differences (document column, distribution keys)
//! live on [`SqlDialect`](super::dialect::SqlDialect), not in this enum.

use std::fmt;

/// SQL column type of a staged column.
///
/// # Examples
///
/// ```ignore
/// use ldp_stage::sql::types::ColumnType;
///
/// assert_eq!(ColumnType::BigInt.sql_type(), "BIGINT");
/// assert!(ColumnType::TimestampTz.is_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnType {
    /// The record identifier. Fixed-width string, always the first column.
    Id,

    /// Boolean.
    Boolean,

    /// 64-bit signed integer (BIGINT).
    BigInt,

    /// Decimal number stored with fixed precision.
    Numeric,

    /// Timestamp with time zone.
    TimestampTz,

    /// Variable-length string.
    Varchar,
}

impl ColumnType {
    /// Maximum character length of a string value accepted by the backend.
    pub const MAX_STRING_LEN: usize = 65535;

    /// DDL spelling of this type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Id => "VARCHAR(36)",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Numeric => "NUMERIC(12,2)",
            ColumnType::TimestampTz => "TIMESTAMPTZ",
            ColumnType::Varchar => "VARCHAR(65535)",
        }
    }

    /// Whether values of this type are written as quoted string literals.
    pub fn is_string(&self) -> bool {
        matches!(
            self,
            ColumnType::Id | ColumnType::TimestampTz | ColumnType::Varchar
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}
