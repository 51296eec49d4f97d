//! Amazon Redshift SQL dialect.
//!
//! Redshift features:
//! - PostgreSQL-based syntax
//! - ANSI identifier quoting (`"`)
//! - Backslash is an escape character inside string literals
//! - No JSON column type; documents are stored as VARCHAR
//! - Distribution and sort keys instead of secondary indexes

use super::helpers;
use super::SqlDialect;

/// Amazon Redshift SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Redshift;

impl SqlDialect for Redshift {
    fn name(&self) -> &'static str {
        "redshift"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_backslash(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_keyword(b)
    }

    fn json_type(&self) -> &'static str {
        "VARCHAR(65535)"
    }

    fn distribution_clause(&self, key: &str) -> Option<String> {
        let key = self.quote_identifier(key);
        Some(format!("DISTKEY({key}) COMPOUND SORTKEY({key})"))
    }
}
