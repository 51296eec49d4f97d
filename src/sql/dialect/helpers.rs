//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, Redshift
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

// =============================================================================
// String Quoting
// =============================================================================
//
// Neither backend stores NUL in a text value, so NUL characters are dropped
// from every string literal.

/// Quote string with single quotes (standard SQL).
/// Used by: Postgres (standard_conforming_strings on)
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\0', "").replace('\'', "''"))
}

/// Quote string with single quotes, also doubling backslashes.
/// Used by: Redshift, which treats `\` as an escape character in literals
pub fn quote_string_backslash(s: &str) -> String {
    format!(
        "'{}'",
        s.replace('\0', "")
            .replace('\\', "\\\\")
            .replace('\'', "''")
    )
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as keyword TRUE/FALSE.
/// Used by: Postgres, Redshift
pub fn format_bool_keyword(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}
