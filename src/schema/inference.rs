//! Schema inference from collected field statistics.
//!
//! Column types are a pure function of each field's [`Counts`]. Precedence:
//!
//! | Observed (non-null) kinds | Column type |
//! |---------------------------|-------------|
//! | field is `id` | identifier |
//! | none (only nulls) | varchar |
//! | boolean only | boolean |
//! | number only, any floating | numeric |
//! | number only, all integer | bigint |
//! | string only, all timestamps | timestamptz |
//! | string only, otherwise | varchar |
//! | more than one kind | error |

use std::collections::BTreeMap;

use super::stats::{Counts, FieldStats};
use super::table::{ColumnSchema, DATA_COLUMN, ID_FIELD, TENANT_COLUMN};
use super::{SchemaError, SchemaResult};
use crate::sql::types::ColumnType;

/// Select the column type for one field.
pub fn select_column_type(field: &str, counts: &Counts) -> SchemaResult<ColumnType> {
    if field == ID_FIELD {
        return Ok(ColumnType::Id);
    }

    let kinds = [counts.boolean, counts.number, counts.string]
        .iter()
        .filter(|&&n| n > 0)
        .count();

    match kinds {
        0 => Ok(ColumnType::Varchar),
        1 if counts.boolean > 0 => Ok(ColumnType::Boolean),
        1 if counts.number > 0 => {
            if counts.floating > 0 {
                Ok(ColumnType::Numeric)
            } else {
                Ok(ColumnType::BigInt)
            }
        }
        1 => {
            if counts.date_time == counts.string {
                Ok(ColumnType::TimestampTz)
            } else {
                Ok(ColumnType::Varchar)
            }
        }
        _ => Err(SchemaError::InconsistentTypes {
            field: field.to_string(),
            counts: *counts,
        }),
    }
}

/// Infer the full column list for a table.
///
/// Returns an empty list when no fields were observed. Otherwise the
/// identifier column comes first, followed by one column per field in
/// ascending field-name order.
pub fn infer_columns(stats: &FieldStats) -> SchemaResult<Vec<ColumnSchema>> {
    if stats.is_empty() {
        return Ok(Vec::new());
    }

    let mut columns = vec![ColumnSchema::id()];
    // Destination name -> source field, seeded with the fixed columns.
    let mut taken: BTreeMap<String, String> = [ID_FIELD, DATA_COLUMN, TENANT_COLUMN]
        .into_iter()
        .map(|c| (c.to_string(), c.to_string()))
        .collect();

    for (field, counts) in stats.iter() {
        if field == ID_FIELD {
            continue;
        }
        let column_type = select_column_type(field, counts)?;
        let column = ColumnSchema::for_field(field, column_type);

        if let Some(existing) = taken.get(&column.name) {
            return Err(SchemaError::ColumnCollision {
                column: column.name,
                first: existing.clone(),
                second: field.to_string(),
            });
        }
        taken.insert(column.name.clone(), field.to_string());

        tracing::debug!(
            field,
            column = %column.name,
            column_type = column_type.sql_type(),
            "inferred column"
        );
        columns.push(column);
    }

    Ok(columns)
}
