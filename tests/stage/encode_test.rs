//! Value encoding limits and substitutions.

use ldp_stage::schema::{ColumnSchema, TableSchema};
use ldp_stage::sql::{ColumnType, Dialect, SqlValue};
use ldp_stage::stage::{RowEncoder, StageError, WarningKind};
use serde_json::{json, Value};

fn table(columns: Vec<ColumnSchema>) -> TableSchema {
    let mut table = TableSchema::new("finance_transactions", "/finance/transactions", "mod-finance");
    table.columns = std::iter::once(ColumnSchema::id()).chain(columns).collect();
    table
}

fn amount_table() -> TableSchema {
    table(vec![ColumnSchema::for_field("amount", ColumnType::Numeric)])
}

fn note_table() -> TableSchema {
    table(vec![ColumnSchema::for_field("note", ColumnType::Varchar)])
}

fn encode(table: &TableSchema, dialect: Dialect, record: Value) -> ldp_stage::stage::EncodedRow {
    RowEncoder::new(table, dialect, 1).encode(&record).unwrap()
}

#[test]
fn test_numeric_limit_is_inclusive() {
    let t = amount_table();

    let exact = encode(&t, Dialect::Postgres, json!({"id": "a", "amount": 10000000000u64}));
    assert_eq!(exact.row.values[1], SqlValue::Int(10_000_000_000));
    assert!(exact.warnings.is_empty());

    let exact_float = encode(&t, Dialect::Postgres, json!({"id": "a", "amount": 10000000000.0}));
    assert_eq!(exact_float.row.values[1], SqlValue::Float(1e10));
    assert!(exact_float.warnings.is_empty());
}

#[test]
fn test_numeric_overflow_stores_zero() {
    let t = amount_table();
    let encoded = encode(&t, Dialect::Postgres, json!({"id": "a", "amount": 10000000000.01}));
    assert_eq!(encoded.row.values[1], SqlValue::Int(0));
    assert_eq!(encoded.warnings.len(), 1);

    let warning = &encoded.warnings[0];
    assert_eq!(warning.kind, WarningKind::NumericOverflow);
    assert_eq!(warning.table, "finance_transactions");
    assert_eq!(warning.column, "amount");
    assert_eq!(warning.id, "a");
    assert_eq!(warning.value, "10000000000.01");
}

#[test]
fn test_string_limit_counts_quoted_literal() {
    let t = note_table();

    // 65532 characters quote to 65534.
    let kept = encode(&t, Dialect::Postgres, json!({"id": "a", "note": "x".repeat(65532)}));
    assert_eq!(kept.row.values[1], SqlValue::Str("x".repeat(65532)));
    assert!(kept
        .warnings
        .iter()
        .all(|w| w.kind != WarningKind::StringTooLong));

    // 65533 characters quote to 65535.
    let nulled = encode(&t, Dialect::Postgres, json!({"id": "a", "note": "x".repeat(65533)}));
    assert_eq!(nulled.row.values[1], SqlValue::Null);
    let warning = nulled
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::StringTooLong)
        .unwrap();
    assert_eq!(warning.column, "note");
    assert!(warning.value.ends_with("(65533 characters)"));
}

#[test]
fn test_string_limit_follows_dialect_escaping() {
    let t = note_table();
    let backslashes = "\\".repeat(32767);

    let pg = encode(&t, Dialect::Postgres, json!({"id": "a", "note": backslashes}));
    assert_eq!(pg.row.values[1], SqlValue::Str(backslashes.clone()));

    let rs = encode(&t, Dialect::Redshift, json!({"id": "a", "note": backslashes}));
    assert_eq!(rs.row.values[1], SqlValue::Null);
}

#[test]
fn test_quotes_count_toward_length() {
    let t = note_table();
    let quotes = "'".repeat(32767);
    let encoded = encode(&t, Dialect::Postgres, json!({"id": "a", "note": quotes}));
    assert_eq!(encoded.row.values[1], SqlValue::Null);
}

#[test]
fn test_document_falls_back_to_compact() {
    let t = table(vec![]);
    let record = json!({"id": "a", "items": vec![1; 8000]});
    let encoded = encode(&t, Dialect::Postgres, record.clone());

    assert!(encoded.warnings.is_empty());
    assert_eq!(
        encoded.row.values[1],
        SqlValue::Str(serde_json::to_string(&record).unwrap())
    );
}

#[test]
fn test_document_too_large_is_null_but_row_kept() {
    let t = table(vec![]);
    let encoded = encode(&t, Dialect::Postgres, json!({"id": "a", "blob": "y".repeat(70000)}));

    assert_eq!(encoded.row.values.len(), 3);
    assert_eq!(encoded.row.values[0], SqlValue::from("a"));
    assert_eq!(encoded.row.values[1], SqlValue::Null);
    assert_eq!(encoded.row.values[2], SqlValue::Int(1));
    assert_eq!(encoded.warnings.len(), 1);
    assert_eq!(encoded.warnings[0].kind, WarningKind::DocumentTooLarge);
    assert_eq!(encoded.warnings[0].column, "data");
}

#[test]
fn test_pretty_document_is_default() {
    let t = note_table();
    let encoded = encode(&t, Dialect::Postgres, json!({"id": "a", "note": "hi"}));
    assert_eq!(
        encoded.row.values[2],
        SqlValue::Str("{\n    \"id\": \"a\",\n    \"note\": \"hi\"\n}".to_string())
    );
}

#[test]
fn test_row_renders_as_sql() {
    let t = note_table();
    let encoded = encode(&t, Dialect::Postgres, json!({"id": "a", "note": "O'Brien"}));
    assert_eq!(
        encoded.row.to_sql(Dialect::Postgres),
        "('a','O''Brien','{\n    \"id\": \"a\",\n    \"note\": \"O''Brien\"\n}',1)"
    );
}

#[test]
fn test_oversized_id_fails_instead_of_null() {
    let t = note_table();
    let id = "i".repeat(65533);
    let err = RowEncoder::new(&t, Dialect::Postgres, 1)
        .encode(&json!({"id": id, "note": "hi"}))
        .unwrap_err();
    match err {
        StageError::OversizedId { table, id } => {
            assert_eq!(table, "finance_transactions");
            assert!(id.ends_with("(65533 characters)"));
        }
        other => panic!("expected oversized id, got {other:?}"),
    }

    let kept = encode(&t, Dialect::Postgres, json!({"id": "i".repeat(65532)}));
    assert_eq!(kept.row.values[0], SqlValue::Str("i".repeat(65532)));
}

#[test]
fn test_nul_characters_never_reach_sql() {
    let t = note_table();
    let encoded = encode(&t, Dialect::Postgres, json!({"id": "a", "note": "a\0b"}));
    let sql = encoded.row.to_sql(Dialect::Postgres);
    assert!(sql.starts_with("('a','ab',"));
    assert!(!sql.contains('\0'));
    assert!(!encoded.row.to_sql(Dialect::Redshift).contains('\0'));
}
