//! Test utilities for SQL emission validation.
//!
//! Provides helpers for validating that emitted SQL is syntactically correct
//! using sqlparser-rs for roundtrip validation.

use sqlparser::dialect::{PostgreSqlDialect, RedshiftSqlDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Validates that a SQL string is syntactically valid for the given dialect.
///
/// Uses sqlparser-rs to parse the SQL and returns an error if parsing fails.
/// Redshift table keys (`DISTKEY`, `SORTKEY`) are not understood by the
/// parser, so CREATE TABLE statements are only validated for Postgres.
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::Redshift => Box::new(RedshiftSqlDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("INSERT INTO users VALUES ('a', 1)", Dialect::Postgres).unwrap();
        validate_sql("INSERT INTO users VALUES ('a', 1)", Dialect::Redshift).unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("INSRT INTO users VALUE", Dialect::Postgres);
        assert!(result.is_err());
    }
}
