//! Staging whole tables from a load directory.

use ldp_stage::schema::TableSchema;
use ldp_stage::sql::{ColumnType, Dialect};
use ldp_stage::stage::{
    stage_tables, Anonymizer, ContinuePolicy, LoadDir, PathClassifier, RecordingExecutor,
    ScriptExecutor, SkipReason, StageError, StageOptions, TableOutcome, TableStager,
};
use std::fs;
use std::path::Path;

fn write_pages(dir: &Path, table: &str, pages: &[&str]) {
    fs::write(dir.join(format!("{table}_count.txt")), format!("{}\n", pages.len())).unwrap();
    for (i, page) in pages.iter().enumerate() {
        fs::write(dir.join(format!("{table}_{i}.json")), page).unwrap();
    }
}

fn users() -> TableSchema {
    TableSchema::new("user_users", "/users", "mod-users")
}

const PAGE_0: &str = r#"[{"id":"a1","name":"Jane","age":30}]"#;
const PAGE_1: &str = r#"[{"id":"a2","name":null,"age":31}]"#;

fn stage(
    dir: &Path,
    table: TableSchema,
    options: &StageOptions,
    anonymizer: &Anonymizer,
) -> (TableOutcome, RecordingExecutor) {
    let load_dir = LoadDir::new(dir);
    let mut exec = RecordingExecutor::new();
    let outcome = TableStager::new(table, &load_dir, options, anonymizer).stage(&mut exec);
    (outcome, exec)
}

#[test]
fn test_two_pages_script() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0, PAGE_1]);

    let load_dir = LoadDir::new(tmp.path());
    let options = StageOptions::default();
    let anonymizer = Anonymizer::inactive();
    let mut exec = ScriptExecutor::new(Vec::new());
    let outcome = TableStager::new(users(), &load_dir, &options, &anonymizer).stage(&mut exec);
    assert!(matches!(outcome, TableOutcome::Staged(_)));

    let script = String::from_utf8(exec.into_inner().unwrap()).unwrap();
    insta::assert_snapshot!(script.trim_end(), @r#"
    CREATE TABLE "user_users_loading" (
        "id" VARCHAR(36) NOT NULL,
        "age" BIGINT,
        "name" VARCHAR(65535),
        "data" JSONB,
        "tenant_id" SMALLINT NOT NULL
    );
    COMMENT ON TABLE "user_users_loading" IS '/users in mod-users: https://dev.folio.org/reference/api/#mod-users';
    GRANT SELECT ON "user_users_loading" TO "ldpconfig";
    GRANT SELECT ON "user_users_loading" TO "ldp";
    INSERT INTO "user_users_loading" VALUES ('a1',30,'Jane','{
        "id": "a1",
        "age": 30,
        "name": "Jane"
    }',1);
    INSERT INTO "user_users_loading" VALUES ('a2',31,NULL,'{
        "id": "a2",
        "age": 31,
        "name": null
    }',1);
    ALTER TABLE "user_users_loading" ADD PRIMARY KEY ("id");
    CREATE INDEX ON "user_users_loading" ("age");
    CREATE INDEX ON "user_users_loading" ("name");
    "#);
}

#[test]
fn test_two_pages_report() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0, PAGE_1]);

    let (outcome, exec) = stage(tmp.path(), users(), &StageOptions::default(), &Anonymizer::inactive());
    let TableOutcome::Staged(report) = outcome else {
        panic!("expected staged table, got {outcome:?}");
    };

    assert_eq!(report.table, "user_users");
    assert_eq!(report.pages, 2);
    assert_eq!(report.records_analyzed, 2);
    assert_eq!(report.rows_inserted, 2);
    assert_eq!(report.statements, exec.statements.len() as u64);
    assert!(report.warnings.is_empty());

    let columns: Vec<(&str, ColumnType)> = report
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.column_type))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("id", ColumnType::Id),
            ("age", ColumnType::BigInt),
            ("name", ColumnType::Varchar),
        ]
    );
    assert_eq!(exec.starting_with("INSERT").count(), 2);
}

#[test]
fn test_missing_count_file_skips_table() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("user_users_0.json"), PAGE_0).unwrap();

    let (outcome, exec) = stage(tmp.path(), users(), &StageOptions::default(), &Anonymizer::inactive());
    assert!(matches!(
        outcome,
        TableOutcome::Skipped {
            reason: SkipReason::MissingPageCount,
            ..
        }
    ));
    assert!(exec.statements.is_empty());
}

#[test]
fn test_redshift_layout() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0, PAGE_1]);
    let options = StageOptions {
        dialect: Dialect::Redshift,
        ..StageOptions::default()
    };

    let (outcome, exec) = stage(tmp.path(), users(), &options, &Anonymizer::inactive());
    assert!(matches!(outcome, TableOutcome::Staged(_)));

    assert!(exec.statements[0].contains("\"data\" VARCHAR(65535)"));
    assert!(exec.statements[0].ends_with("DISTKEY(\"id\") COMPOUND SORTKEY(\"id\")"));
    assert_eq!(exec.starting_with("CREATE INDEX").count(), 0);
    assert_eq!(exec.starting_with("ALTER TABLE").count(), 1);
}

#[test]
fn test_test_file_read_in_both_passes() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0]);
    fs::write(
        tmp.path().join("user_users_test.json"),
        r#"[{"id":"t1","name":"Test","age":1,"barcode":"123"}]"#,
    )
    .unwrap();

    let (outcome, _) = stage(tmp.path(), users(), &StageOptions::default(), &Anonymizer::inactive());
    let TableOutcome::Staged(report) = outcome else {
        panic!("expected staged table");
    };
    assert_eq!(report.pages, 2);
    assert_eq!(report.rows_inserted, 2);
    assert!(report.columns.iter().any(|c| c.name == "barcode"));

    let options = StageOptions {
        include_test_file: false,
        ..StageOptions::default()
    };
    let (outcome, _) = stage(tmp.path(), users(), &options, &Anonymizer::inactive());
    let TableOutcome::Staged(report) = outcome else {
        panic!("expected staged table");
    };
    assert_eq!(report.rows_inserted, 1);
    assert!(!report.columns.iter().any(|c| c.name == "barcode"));
}

#[test]
fn test_envelope_pages() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(
        tmp.path(),
        "user_users",
        &[r#"{"users":[{"id":"a1","age":1},{"id":"a2","age":2}],"totalRecords":2}"#],
    );

    let (outcome, exec) = stage(tmp.path(), users(), &StageOptions::default(), &Anonymizer::inactive());
    assert!(matches!(outcome, TableOutcome::Staged(ref r) if r.rows_inserted == 2));
    assert_eq!(exec.starting_with("INSERT").count(), 1);
}

#[test]
fn test_anonymized_values_are_stored() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0]);
    let anonymizer = Anonymizer::new(["user_users"], PathClassifier::new(["/name", "/age"]));

    let (outcome, exec) = stage(tmp.path(), users(), &StageOptions::default(), &anonymizer);
    assert!(matches!(outcome, TableOutcome::Staged(_)));

    let insert = exec.starting_with("INSERT").next().unwrap();
    assert!(insert.contains("('a1',0,'',"));
    assert!(!insert.contains("Jane"));
}

#[test]
fn test_nul_characters_removed_from_row_and_document() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[r#"[{"id":"a1","name":"Ja\u0000ne","age":30}]"#]);

    let (outcome, exec) = stage(tmp.path(), users(), &StageOptions::default(), &Anonymizer::inactive());
    assert!(matches!(outcome, TableOutcome::Staged(_)));

    let insert = exec.starting_with("INSERT").next().unwrap();
    assert!(insert.contains("('a1',30,'Jane',"));
    assert!(insert.contains("\"name\": \"Jane\""));
    assert!(!insert.contains('\0'));
    assert!(!insert.contains("\\u0000"));
}

#[test]
fn test_oversized_values_warn_but_load() {
    let tmp = tempfile::tempdir().unwrap();
    let page = format!(
        r#"[{{"id":"a1","name":"{}","balance":12000000000.5}}]"#,
        "n".repeat(70000)
    );
    write_pages(tmp.path(), "user_users", &[&page]);

    let (outcome, exec) = stage(tmp.path(), users(), &StageOptions::default(), &Anonymizer::inactive());
    let TableOutcome::Staged(report) = outcome else {
        panic!("expected staged table");
    };
    assert_eq!(report.rows_inserted, 1);
    assert_eq!(report.warnings.len(), 3);
    assert_eq!(
        exec.starting_with("INSERT").next().unwrap(),
        "INSERT INTO \"user_users_loading\" VALUES ('a1',0,NULL,NULL,1)"
    );
}

#[test]
fn test_malformed_page_fails_before_ddl() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0, r#"[{"id":"a2",}"#]);

    let (outcome, exec) = stage(tmp.path(), users(), &StageOptions::default(), &Anonymizer::inactive());
    match outcome {
        TableOutcome::Failed { table, error: StageError::Parse { path, .. } } => {
            assert_eq!(table, "user_users");
            assert!(path.ends_with("user_users_1.json"));
        }
        other => panic!("expected parse failure, got {other:?}"),
    }
    assert!(exec.statements.is_empty());
}

#[test]
fn test_execution_failure_fails_table() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0]);

    let load_dir = LoadDir::new(tmp.path());
    let options = StageOptions::default();
    let anonymizer = Anonymizer::inactive();
    // Statements 0..=3 provision the table; 4 is the first insert.
    let mut exec = RecordingExecutor::failing_at(4);
    let outcome = TableStager::new(users(), &load_dir, &options, &anonymizer).stage(&mut exec);
    assert!(matches!(
        outcome,
        TableOutcome::Failed {
            error: StageError::Exec(_),
            ..
        }
    ));
    assert_eq!(exec.statements.len(), 4);
}

#[test]
fn test_stage_tables_continues_past_failures() {
    let tmp = tempfile::tempdir().unwrap();
    write_pages(tmp.path(), "user_users", &[PAGE_0]);
    write_pages(tmp.path(), "circulation_loans", &[r#"[{"id":"l1","n":1},{"id":"l2","n":"x"}]"#]);

    let load_dir = LoadDir::new(tmp.path());
    let tables = vec![
        TableSchema::new("circulation_loans", "/loan-storage/loans", "mod-circulation-storage"),
        TableSchema::new("inventory_items", "/item-storage/items", "mod-inventory-storage"),
        users(),
    ];
    let mut exec = RecordingExecutor::new();
    let outcomes = stage_tables(
        tables,
        &load_dir,
        &StageOptions::default(),
        &Anonymizer::inactive(),
        &mut exec,
        ContinuePolicy::Continue,
    );

    let summary: Vec<(&str, &str)> = outcomes
        .iter()
        .map(|o| {
            let state = match o {
                TableOutcome::Staged(_) => "staged",
                TableOutcome::Skipped { .. } => "skipped",
                TableOutcome::Failed { .. } => "failed",
            };
            (o.table(), state)
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("circulation_loans", "failed"),
            ("inventory_items", "skipped"),
            ("user_users", "staged"),
        ]
    );
}
