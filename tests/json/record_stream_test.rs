//! Streaming page files from disk.

use ldp_stage::json::{PageItem, ParseError, ParseResult, RecordStream};
use serde_json::{json, Value};
use std::fs;
use std::io::Write;

fn records(items: &[PageItem]) -> Vec<&Value> {
    items
        .iter()
        .filter_map(|item| match item {
            PageItem::Record(v) => Some(v),
            _ => None,
        })
        .collect()
}

#[test]
fn test_stream_page_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("user_users_0.json");
    fs::write(
        &path,
        r#"[
            {"id": "a1", "personal": {"lastName": "Doe"}, "active": true},
            {"id": "a2", "personal": {"lastName": "Roe"}, "active": false}
        ]"#,
    )
    .unwrap();

    let items: Vec<PageItem> = RecordStream::open(&path)
        .unwrap()
        .collect::<ParseResult<_>>()
        .unwrap();

    assert_eq!(items.first(), Some(&PageItem::ArrayStart));
    assert_eq!(items.last(), Some(&PageItem::ArrayEnd));
    assert_eq!(
        records(&items),
        vec![
            &json!({"id": "a1", "personal": {"lastName": "Doe"}, "active": true}),
            &json!({"id": "a2", "personal": {"lastName": "Roe"}, "active": false}),
        ]
    );
}

#[test]
fn test_many_records_stream_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("big_0.json");
    let mut f = fs::File::create(&path).unwrap();
    write!(f, "[").unwrap();
    for i in 0..5000 {
        if i > 0 {
            write!(f, ",").unwrap();
        }
        write!(f, r#"{{"id":"r{i}","n":{i},"tags":["a","b"]}}"#).unwrap();
    }
    write!(f, "]").unwrap();
    drop(f);

    let mut count = 0;
    for item in RecordStream::open(&path).unwrap() {
        if let PageItem::Record(v) = item.unwrap() {
            assert_eq!(v["n"], json!(count));
            count += 1;
        }
    }
    assert_eq!(count, 5000);
}

#[test]
fn test_envelope_with_multiple_arrays() {
    let input = r#"{"loans": [{"id": "l1"}], "totalRecords": 1, "extra": [{"id": "x1"}, 5]}"#;
    let items: Vec<PageItem> = RecordStream::new(input.as_bytes())
        .collect::<ParseResult<_>>()
        .unwrap();
    assert_eq!(
        items,
        vec![
            PageItem::ArrayStart,
            PageItem::Record(json!({"id": "l1"})),
            PageItem::ArrayEnd,
            PageItem::ArrayStart,
            PageItem::Record(json!({"id": "x1"})),
            PageItem::ArrayEnd,
        ]
    );
}

#[test]
fn test_unicode_and_escapes_preserved() {
    let input = r#"[{"id":"a","name":"Zoë \"Z\" Ångström","note":"tab\there","emoji":"😀"}]"#;
    let items: Vec<PageItem> = RecordStream::new(input.as_bytes())
        .collect::<ParseResult<_>>()
        .unwrap();
    let v = records(&items)[0];
    assert_eq!(v["name"], "Zoë \"Z\" Ångström");
    assert_eq!(v["note"], "tab\there");
    assert_eq!(v["emoji"], "😀");
}

#[test]
fn test_malformed_input_reports_error_and_stops() {
    let input = "[{\"id\":\"a\"},\n{\"id\" \"b\"}]";
    let mut stream = RecordStream::new(input.as_bytes());
    assert_eq!(stream.next().unwrap().unwrap(), PageItem::ArrayStart);
    assert!(matches!(stream.next().unwrap().unwrap(), PageItem::Record(_)));

    match stream.next().unwrap() {
        Err(ParseError::Syntax { position, .. }) => assert_eq!(position.line, 2),
        other => panic!("expected syntax error, got {other:?}"),
    }
    assert!(stream.next().is_none());
}

#[test]
fn test_truncated_input() {
    let input = r#"[{"id":"a"},{"id":"#;
    let result: ParseResult<Vec<PageItem>> = RecordStream::new(input.as_bytes()).collect();
    assert!(result.is_err());
}

#[test]
fn test_scalar_document_rejected() {
    let result: ParseResult<Vec<PageItem>> = RecordStream::new("42".as_bytes()).collect();
    assert!(matches!(result, Err(ParseError::NotARecordArray { .. })));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        RecordStream::open("/nonexistent/page_0.json"),
        Err(ParseError::Io(_))
    ));
}
