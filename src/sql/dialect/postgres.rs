//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features used by staging:
//! - ANSI identifier quoting (`"`)
//! - Standard-conforming string literals (backslash is literal)
//! - Native JSONB document column
//! - Secondary B-tree indexes on loading tables

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_keyword(b)
    }

    fn json_type(&self) -> &'static str {
        "JSONB"
    }

    fn supports_secondary_indexes(&self) -> bool {
        true
    }
}
