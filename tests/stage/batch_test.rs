//! Insert batching across the statement size threshold.

use ldp_stage::sql::{Dialect, Row, SqlValue};
use ldp_stage::stage::{BatchWriter, RecordingExecutor, DEFAULT_BATCH_THRESHOLD};

const HEADER: &str = "INSERT INTO \"t_loading\" VALUES ";

fn row(id: usize, payload: &str) -> Row {
    Row::new([
        SqlValue::from(format!("{id:08}")),
        SqlValue::from(payload),
        SqlValue::Int(1),
    ])
}

/// Row literals of one statement, split back apart.
fn tuple_count(statement: &str) -> usize {
    statement.matches(",1)").count()
}

#[test]
fn test_default_threshold_splits_large_input() {
    let payload = "p".repeat(100_000);
    let rows: Vec<Row> = (0..200).map(|i| row(i, &payload)).collect();
    let row_len = rows[0].to_sql(Dialect::Postgres).len();

    let mut exec = RecordingExecutor::new();
    let mut writer = BatchWriter::begin("t_loading", Dialect::Postgres, DEFAULT_BATCH_THRESHOLD);
    for r in &rows {
        writer.push(r, &mut exec).unwrap();
    }
    writer.finish(&mut exec).unwrap();

    assert!(exec.statements.len() > 1);
    assert_eq!(writer.statements() as usize, exec.statements.len());
    assert_eq!(writer.rows(), 200);

    let total: usize = exec.statements.iter().map(|s| tuple_count(s)).sum();
    assert_eq!(total, 200);

    for statement in &exec.statements {
        assert!(statement.starts_with(HEADER));
        // Only the row that crossed the threshold may extend past it.
        assert!(statement.len() - row_len - 1 <= DEFAULT_BATCH_THRESHOLD);
    }
}

#[test]
fn test_statements_hold_rows_in_order() {
    let mut exec = RecordingExecutor::new();
    let mut writer = BatchWriter::begin("t_loading", Dialect::Postgres, 200);
    for i in 0..50 {
        writer.push(&row(i, "x"), &mut exec).unwrap();
    }
    writer.finish(&mut exec).unwrap();

    let ids: Vec<usize> = exec
        .statements
        .iter()
        .flat_map(|s| {
            s[HEADER.len()..]
                .split("),(")
                .map(|t| t.trim_start_matches("('")[..8].parse::<usize>().unwrap())
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(ids, (0..50).collect::<Vec<_>>());
    assert!(exec.statements.len() > 1);
}

#[test]
fn test_each_array_is_its_own_batch() {
    let mut exec = RecordingExecutor::new();

    let mut first = BatchWriter::begin("t_loading", Dialect::Postgres, DEFAULT_BATCH_THRESHOLD);
    first.push(&row(0, "x"), &mut exec).unwrap();
    first.finish(&mut exec).unwrap();

    let mut empty = BatchWriter::begin("t_loading", Dialect::Postgres, DEFAULT_BATCH_THRESHOLD);
    empty.finish(&mut exec).unwrap();

    let mut second = BatchWriter::begin("t_loading", Dialect::Postgres, DEFAULT_BATCH_THRESHOLD);
    second.push(&row(1, "y"), &mut exec).unwrap();
    second.finish(&mut exec).unwrap();

    assert_eq!(
        exec.statements,
        vec![
            format!("{HEADER}('00000000','x',1)"),
            format!("{HEADER}('00000001','y',1)"),
        ]
    );
}
