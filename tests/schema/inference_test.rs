//! Statistics collection and schema inference over record streams.

use ldp_stage::json::{PageItem, ParseResult, RecordStream};
use ldp_stage::schema::{infer_columns, FieldStats, SchemaError};
use ldp_stage::sql::ColumnType;
use serde_json::Value;

fn stats_for(page: &str) -> FieldStats {
    let mut stats = FieldStats::new();
    for item in RecordStream::new(page.as_bytes()) {
        if let PageItem::Record(v) = item.unwrap() {
            stats.observe_record(&v);
        }
    }
    stats
}

fn column_types(page: &str) -> Vec<(String, ColumnType)> {
    infer_columns(&stats_for(page))
        .unwrap()
        .into_iter()
        .map(|c| (c.name, c.column_type))
        .collect()
}

const LOANS: &str = r#"[
    {"id": "0a1b2c3d-4e5f-6789-abcd-ef0123456789", "userId": "1a1b2c3d-4e5f-6789-abcd-ef0123456789",
     "dueDate": "2020-03-01T10:00:00.000+0000", "renewalCount": 0, "fee": 1.5, "open": true,
     "action": "checkedout", "metadata": {"createdDate": "2020-01-01T00:00:00Z"}},
    {"id": "2a1b2c3d-4e5f-6789-abcd-ef0123456789", "userId": null,
     "dueDate": "2020-03-02T10:00:00.000+0000", "renewalCount": 2, "fee": 2, "open": false,
     "action": "renewed", "proxyUserId": null}
]"#;

#[test]
fn test_infer_loan_columns() {
    assert_eq!(
        column_types(LOANS),
        vec![
            ("id".to_string(), ColumnType::Id),
            ("action".to_string(), ColumnType::Varchar),
            ("due_date".to_string(), ColumnType::TimestampTz),
            ("fee".to_string(), ColumnType::Numeric),
            ("open".to_string(), ColumnType::Boolean),
            ("proxy_user_id".to_string(), ColumnType::Varchar),
            ("renewal_count".to_string(), ColumnType::BigInt),
            ("user_id".to_string(), ColumnType::Varchar),
        ]
    );
}

#[test]
fn test_source_names_kept_for_lookup() {
    let columns = infer_columns(&stats_for(LOANS)).unwrap();
    let due = columns.iter().find(|c| c.name == "due_date").unwrap();
    assert_eq!(due.source_name, "dueDate");
}

#[test]
fn test_inference_independent_of_record_order() {
    let records: Vec<Value> = match serde_json::from_str::<Value>(LOANS).unwrap() {
        Value::Array(items) => items,
        _ => unreachable!(),
    };
    let reversed: Vec<Value> = records.iter().rev().cloned().collect();

    let forward = serde_json::to_string(&records).unwrap();
    let backward = serde_json::to_string(&reversed).unwrap();
    assert_eq!(column_types(&forward), column_types(&backward));
}

#[test]
fn test_count_invariants_hold() {
    let stats = stats_for(LOANS);
    assert_eq!(stats.records(), 2);
    for (field, c) in stats.iter() {
        assert_eq!(c.integer + c.floating, c.number, "field {field}");
        assert!(c.classified() <= stats.records(), "field {field}");
        assert!(c.uuid <= c.string && c.date_time <= c.string, "field {field}");
    }
}

#[test]
fn test_mixed_kinds_fail() {
    let stats = stats_for(r#"[{"id":"a","code":1},{"id":"b","code":"1"}]"#);
    match infer_columns(&stats) {
        Err(SchemaError::InconsistentTypes { field, counts }) => {
            assert_eq!(field, "code");
            assert_eq!((counts.number, counts.string), (1, 1));
        }
        other => panic!("expected inconsistent types, got {other:?}"),
    }
}

#[test]
fn test_partial_timestamps_stay_varchar() {
    let types = column_types(r#"[{"id":"a","when":"2020-01-01T00:00:00Z"},{"id":"b","when":"soon"}]"#);
    assert_eq!(types[1], ("when".to_string(), ColumnType::Varchar));
}

#[test]
fn test_colliding_column_names_fail() {
    let stats = stats_for(r#"[{"id":"a","userId":"x","user_id":"y"}]"#);
    assert!(matches!(
        infer_columns(&stats),
        Err(SchemaError::ColumnCollision { .. })
    ));

    let stats = stats_for(r#"[{"id":"a","tenantId":1}]"#);
    assert!(matches!(
        infer_columns(&stats),
        Err(SchemaError::ColumnCollision { column, .. }) if column == "tenant_id"
    ));
}

#[test]
fn test_empty_page_has_no_columns() {
    assert!(column_types("[]").is_empty());
    let result: ParseResult<Vec<PageItem>> = RecordStream::new("[]".as_bytes()).collect();
    assert_eq!(result.unwrap().len(), 2);
}
