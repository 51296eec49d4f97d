//! SQL Value Encoder.
//!
//! Turns one canonical record into a VALUES row for its loading table:
//! identifier, inferred value columns, the raw document, and the tenant
//! marker, in that order. Oversized or out-of-range values never fail the
//! row. They are replaced (NULL or `0`) and reported as [`DataWarning`]s.

use std::fmt;

use serde_json::Value;

use super::error::{StageError, StageResult};
use super::record;
use crate::schema::table::{ColumnSchema, TableSchema, DATA_COLUMN, ID_FIELD};
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::dml::{Row, SqlValue};
use crate::sql::types::ColumnType;

/// Largest numeric magnitude stored as-is.
pub const NUMERIC_LIMIT: f64 = 10_000_000_000.0;

/// Longest value accepted in a string column or the document column.
pub const MAX_STRING_LEN: usize = ColumnType::MAX_STRING_LEN;

// ============================================================================
// Warnings
// ============================================================================

/// What went wrong with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Numeric magnitude above [`NUMERIC_LIMIT`].
    NumericOverflow,
    /// Escaped string literal of [`MAX_STRING_LEN`] characters or more.
    StringTooLong,
    /// Raw document over [`MAX_STRING_LEN`] characters even when compact.
    DocumentTooLarge,
}

impl WarningKind {
    /// Description of the substitution made.
    pub fn action(&self) -> &'static str {
        match self {
            WarningKind::NumericOverflow => "numeric value out of range, storing 0",
            WarningKind::StringTooLong => "string value too long, storing NULL",
            WarningKind::DocumentTooLarge => "document too large, storing NULL",
        }
    }

    /// The value stored in place of the original.
    pub fn substitute(&self) -> SqlValue {
        match self {
            WarningKind::NumericOverflow => SqlValue::Int(0),
            WarningKind::StringTooLong | WarningKind::DocumentTooLarge => SqlValue::Null,
        }
    }
}

/// A data-quality problem found while encoding one value.
#[derive(Debug, Clone, PartialEq)]
pub struct DataWarning {
    pub table: String,
    pub column: String,
    /// Identifier of the record the value belongs to.
    pub id: String,
    /// Short rendering of the offending value.
    pub value: String,
    pub kind: WarningKind,
}

impl DataWarning {
    pub fn action(&self) -> &'static str {
        self.kind.action()
    }

    /// Report through the log.
    pub fn log(&self) {
        tracing::warn!(
            table = %self.table,
            column = %self.column,
            id = %self.id,
            value = %self.value,
            "{}",
            self.action()
        );
    }
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: table={} column={} id={} value={}",
            self.action(),
            self.table,
            self.column,
            self.id,
            self.value
        )
    }
}

/// Abbreviated form of a long string for warnings.
fn describe_string(s: &str) -> String {
    const PREVIEW: usize = 40;
    let len = s.chars().count();
    if len <= PREVIEW {
        return s.to_string();
    }
    let head: String = s.chars().take(PREVIEW).collect();
    format!("{head}... ({len} characters)")
}

// ============================================================================
// Encoder
// ============================================================================

/// One encoded row and the warnings raised while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRow {
    pub row: Row,
    pub warnings: Vec<DataWarning>,
}

/// Encodes records of one table.
#[derive(Debug, Clone, Copy)]
pub struct RowEncoder<'a> {
    table: &'a TableSchema,
    dialect: Dialect,
    tenant_id: i16,
}

impl<'a> RowEncoder<'a> {
    pub fn new(table: &'a TableSchema, dialect: Dialect, tenant_id: i16) -> Self {
        Self {
            table,
            dialect,
            tenant_id,
        }
    }

    /// Encode a canonical record.
    ///
    /// Fails only when the record has no usable string identifier or a value
    /// does not fit its column's type.
    pub fn encode(&self, record: &Value) -> StageResult<EncodedRow> {
        let id = record
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| StageError::MissingId {
                table: self.table.name.clone(),
            })?;

        // The identifier column is NOT NULL, so it cannot degrade like other strings.
        if self.dialect.quote_string(id).chars().count() >= MAX_STRING_LEN {
            return Err(StageError::OversizedId {
                table: self.table.name.clone(),
                id: describe_string(id),
            });
        }

        let mut warnings = Vec::new();
        let mut row = Row::default();
        row.push(SqlValue::Str(id.to_string()));

        for column in self.table.value_columns() {
            let value = record.get(&column.source_name).unwrap_or(&Value::Null);
            row.push(self.encode_value(column, value, id, &mut warnings)?);
        }

        row.push(self.encode_document(record, id, &mut warnings));
        row.push(SqlValue::Int(i64::from(self.tenant_id)));

        Ok(EncodedRow { row, warnings })
    }

    /// Encode one column value.
    pub fn encode_value(
        &self,
        column: &ColumnSchema,
        value: &Value,
        id: &str,
        warnings: &mut Vec<DataWarning>,
    ) -> StageResult<SqlValue> {
        // Nested values live in the document column only.
        if value.is_null() || value.is_array() || value.is_object() {
            return Ok(SqlValue::Null);
        }

        match (column.column_type, value) {
            (ColumnType::Boolean, Value::Bool(b)) => Ok(SqlValue::Bool(*b)),
            (ColumnType::BigInt, Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(SqlValue::UInt(u))
                } else {
                    Err(self.mismatch(column, id, "a fractional number"))
                }
            }
            (ColumnType::Numeric, Value::Number(n)) => {
                let v = n.as_f64().unwrap_or(f64::INFINITY);
                if v.abs() > NUMERIC_LIMIT {
                    let warning =
                        self.warning(column, id, n.to_string(), WarningKind::NumericOverflow);
                    return Ok(self.degrade(warning, warnings));
                }
                Ok(match n.as_i64() {
                    Some(i) => SqlValue::Int(i),
                    None => SqlValue::Float(v),
                })
            }
            // Redaction empties strings; an empty timestamp is unknown.
            (ColumnType::TimestampTz, Value::String(s)) if s.is_empty() => Ok(SqlValue::Null),
            (ty, Value::String(s)) if ty.is_string() => {
                Ok(self.encode_string(column, s, id, warnings))
            }
            (_, other) => Err(self.mismatch(column, id, json_kind(other))),
        }
    }

    fn encode_string(
        &self,
        column: &ColumnSchema,
        s: &str,
        id: &str,
        warnings: &mut Vec<DataWarning>,
    ) -> SqlValue {
        if self.dialect.quote_string(s).chars().count() >= MAX_STRING_LEN {
            let warning = self.warning(column, id, describe_string(s), WarningKind::StringTooLong);
            return self.degrade(warning, warnings);
        }
        SqlValue::Str(s.to_string())
    }

    fn encode_document(&self, record: &Value, id: &str, warnings: &mut Vec<DataWarning>) -> SqlValue {
        let fits = |text: &str| self.dialect.quote_string(text).chars().count() <= MAX_STRING_LEN;

        let pretty = record::to_pretty(record).ok();
        if let Some(text) = pretty.filter(|t| fits(t)) {
            return SqlValue::Str(text);
        }
        let compact = record::to_compact(record).ok();
        match compact {
            Some(text) if fits(&text) => SqlValue::Str(text),
            other => {
                let len = other.map(|t| t.chars().count()).unwrap_or_default();
                let warning = DataWarning {
                    table: self.table.name.clone(),
                    column: DATA_COLUMN.to_string(),
                    id: id.to_string(),
                    value: format!("({len} characters)"),
                    kind: WarningKind::DocumentTooLarge,
                };
                self.degrade(warning, warnings)
            }
        }
    }

    fn warning(
        &self,
        column: &ColumnSchema,
        id: &str,
        value: String,
        kind: WarningKind,
    ) -> DataWarning {
        DataWarning {
            table: self.table.name.clone(),
            column: column.name.clone(),
            id: id.to_string(),
            value,
            kind,
        }
    }

    fn degrade(&self, warning: DataWarning, warnings: &mut Vec<DataWarning>) -> SqlValue {
        warning.log();
        let substitute = warning.kind.substitute();
        warnings.push(warning);
        substitute
    }

    fn mismatch(&self, column: &ColumnSchema, id: &str, found: &'static str) -> StageError {
        StageError::TypeMismatch {
            table: self.table.name.clone(),
            column: column.name.clone(),
            id: id.to_string(),
            expected: column.column_type,
            found,
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
