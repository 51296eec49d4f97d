//! DML (Data Manipulation Language) support.
//!
//! Staging only ever inserts. Rows are rendered one at a time so that a batch
//! writer can append them to an open `INSERT ... VALUES` buffer without
//! holding every row in memory.
//!
//! # Examples
//!
//! ```ignore
//! use ldp_stage::sql::dml::{Insert, Row, SqlValue};
//! use ldp_stage::sql::dialect::Dialect;
//!
//! let mut sql = Insert::into("users_loading").header_sql(Dialect::Postgres);
//! let row = Row::new([SqlValue::from("a1"), SqlValue::Int(30), SqlValue::Int(1)]);
//! sql.push_str(&row.to_sql(Dialect::Postgres));
//! ```

use super::dialect::Dialect;
use super::token::{Token, TokenStream};

// ============================================================================
// Values
// ============================================================================

/// A literal value in a VALUES row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl SqlValue {
    /// Token for this value.
    pub fn to_token(&self) -> Token {
        match self {
            SqlValue::Null => Token::LitNull,
            SqlValue::Bool(b) => Token::LitBool(*b),
            SqlValue::Int(n) => Token::LitInt(*n),
            SqlValue::UInt(n) => Token::LitUInt(*n),
            SqlValue::Float(f) => Token::LitFloat(*f),
            SqlValue::Str(s) => Token::LitString(s.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Str(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Str(s)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

// ============================================================================
// Row
// ============================================================================

/// One parenthesized tuple of a VALUES list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub values: Vec<SqlValue>,
}

impl Row {
    /// Create a row from values in column order.
    pub fn new(values: impl IntoIterator<Item = SqlValue>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Append a value.
    pub fn push(&mut self, value: SqlValue) {
        self.values.push(value);
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens().serialize(dialect)
    }

    /// Convert to token stream. Values are separated by bare commas to keep
    /// large batches compact.
    pub fn to_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.lparen();
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.push(value.to_token());
        }
        ts.rparen();
        ts
    }
}

// ============================================================================
// INSERT
// ============================================================================

/// INSERT ... VALUES statement prefix.
///
/// Rows are appended to the rendered header by the caller, which controls
/// how many rows go into one statement.
#[derive(Debug, Clone)]
#[must_use = "DML statements have no effect until converted to SQL with header_sql()"]
pub struct Insert {
    pub table: String,
}

impl Insert {
    /// Create a new INSERT statement.
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Statement prefix up to and including `VALUES `.
    pub fn header_tokens(&self) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .push(Token::Ident(self.table.clone()))
            .space()
            .push(Token::Values)
            .space();
        ts
    }

    /// Statement prefix rendered for a dialect.
    pub fn header_sql(&self, dialect: Dialect) -> String {
        self.header_tokens().serialize(dialect)
    }
}
