//! SQL Dialect definitions and formatting rules.
//!
//! This module provides a trait-based abstraction for the differences between
//! the staging backends. Each dialect implements `SqlDialect` to handle its
//! specific syntax:
//!
//! - Identifier quoting: `"` for both backends
//! - String literal escaping: Redshift also escapes backslashes
//! - Document column type: JSONB vs VARCHAR
//! - Physical layout: distribution/sort keys vs secondary indexes
//!
//! # Usage
//!
//! ```ignore
//! use ldp_stage::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! ```
//!
//! | Feature | PostgreSQL | Redshift |
//! |---------|-----------|----------|
//! | JSONB | ✓ | ❌ (VARCHAR) |
//! | CREATE INDEX | ✓ | ❌ |
//! | DISTKEY / SORTKEY | ❌ | ✓ |
//! | COMMENT ON TABLE | ✓ | ✓ |

pub mod helpers;
mod postgres;
mod redshift;

pub use postgres::Postgres;
pub use redshift::Redshift;

use std::str::FromStr;

use super::types::ColumnType;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow PostgreSQL where possible.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, role).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// Default uses single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    // =========================================================================
    // DDL Support
    // =========================================================================

    /// Emit a column type for this dialect.
    fn emit_column_type(&self, ty: ColumnType) -> String {
        ty.sql_type().into()
    }

    /// Type of the column holding the full JSON document.
    fn json_type(&self) -> &'static str;

    /// Trailing table clause that sets distribution and sort keys, if any.
    fn distribution_clause(&self, key: &str) -> Option<String> {
        let _ = key;
        None
    }

    /// Whether this dialect supports `CREATE INDEX`.
    fn supports_secondary_indexes(&self) -> bool {
        false
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    Redshift,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::Redshift => &Redshift,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn emit_column_type(&self, ty: ColumnType) -> String {
        self.dialect().emit_column_type(ty)
    }

    fn json_type(&self) -> &'static str {
        self.dialect().json_type()
    }

    fn distribution_clause(&self, key: &str) -> Option<String> {
        self.dialect().distribution_clause(key)
    }

    fn supports_secondary_indexes(&self) -> bool {
        self.dialect().supports_secondary_indexes()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "redshift" => Ok(Dialect::Redshift),
            other => Err(format!(
                "unknown dialect '{}' (expected 'postgres' or 'redshift')",
                other
            )),
        }
    }
}
