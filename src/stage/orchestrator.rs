//! Stage Orchestrator.
//!
//! Drives the two-pass protocol for one table:
//!
//! ```text
//! AwaitPageCount -> Pass1Analyze -> Pass1BuildSchema -> Pass1CreateTable
//!                -> Pass2Load -> Pass2Index -> Done
//! ```
//!
//! `AwaitPageCount` may end in `Skipped`; any later phase may end in
//! `Failed`. A [`TableStager`] owns everything staged for its table (the
//! statistics, the schema, the open insert batch), so nothing is shared
//! between tables.

use std::fmt;
use std::path::Path;

use serde_json::Value;

use super::anonymize::Anonymizer;
use super::batch::{BatchWriter, DEFAULT_BATCH_THRESHOLD};
use super::encode::{DataWarning, RowEncoder};
use super::error::{StageError, StageResult};
use super::exec::SqlExecutor;
use super::files::{LoadDir, PageFiles};
use super::provision::{ProvisionOptions, TableProvisioner};
use super::record;
use crate::json::{PageItem, ParseError, RecordStream};
use crate::schema::{infer_columns, ColumnSchema, FieldStats, TableSchema};
use crate::sql::dialect::Dialect;

// ============================================================================
// Phases
// ============================================================================

/// Where a table is in the staging protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    AwaitPageCount,
    Pass1Analyze,
    Pass1BuildSchema,
    Pass1CreateTable,
    Pass2Load,
    Pass2Index,
    Done,
    Skipped,
    Failed,
}

impl StagePhase {
    pub fn name(&self) -> &'static str {
        match self {
            StagePhase::AwaitPageCount => "await-page-count",
            StagePhase::Pass1Analyze => "analyze",
            StagePhase::Pass1BuildSchema => "build-schema",
            StagePhase::Pass1CreateTable => "create-table",
            StagePhase::Pass2Load => "load",
            StagePhase::Pass2Index => "index",
            StagePhase::Done => "done",
            StagePhase::Skipped => "skipped",
            StagePhase::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StagePhase::Done | StagePhase::Skipped | StagePhase::Failed
        )
    }
}

impl fmt::Display for StagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Options and results
// ============================================================================

/// Settings shared by every table of a run.
#[derive(Debug, Clone)]
pub struct StageOptions {
    pub dialect: Dialect,
    /// Tenant marker stored with every row.
    pub tenant_id: i16,
    /// Statement size past which an insert batch is flushed.
    pub batch_threshold: usize,
    /// Also read `<table>_test.json` when present.
    pub include_test_file: bool,
    pub provision: ProvisionOptions,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            tenant_id: 1,
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
            include_test_file: true,
            provision: ProvisionOptions::default(),
        }
    }
}

/// Summary of a staged table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageReport {
    pub table: String,
    /// Files read per pass, the test file included.
    pub pages: u64,
    pub records_analyzed: u64,
    pub rows_inserted: u64,
    /// Statements executed, DDL included.
    pub statements: u64,
    pub columns: Vec<ColumnSchema>,
    pub warnings: Vec<DataWarning>,
}

/// Why a table was not staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The table is marked as having no data upstream.
    NoData,
    /// The page-count file does not exist.
    MissingPageCount,
    /// The page-count file declares zero pages.
    NoPages,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::NoData => "no data upstream",
            SkipReason::MissingPageCount => "page count file not found",
            SkipReason::NoPages => "zero pages",
        })
    }
}

/// Final state of one table.
#[derive(Debug)]
pub enum TableOutcome {
    Staged(StageReport),
    Skipped { table: String, reason: SkipReason },
    Failed { table: String, error: StageError },
}

impl TableOutcome {
    pub fn table(&self) -> &str {
        match self {
            TableOutcome::Staged(report) => &report.table,
            TableOutcome::Skipped { table, .. } | TableOutcome::Failed { table, .. } => table,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TableOutcome::Failed { .. })
    }
}

/// Result of pass 1 without side effects on the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub pages: PageFiles,
    pub stats: FieldStats,
    pub columns: Vec<ColumnSchema>,
}

// ============================================================================
// TableStager
// ============================================================================

/// Stages a single table.
#[derive(Debug)]
pub struct TableStager<'a> {
    table: TableSchema,
    load_dir: &'a LoadDir,
    options: &'a StageOptions,
    anonymizer: &'a Anonymizer,
    phase: StagePhase,
    report: StageReport,
}

impl<'a> TableStager<'a> {
    pub fn new(
        table: TableSchema,
        load_dir: &'a LoadDir,
        options: &'a StageOptions,
        anonymizer: &'a Anonymizer,
    ) -> Self {
        let report = StageReport {
            table: table.name.clone(),
            ..StageReport::default()
        };
        Self {
            table,
            load_dir,
            options,
            anonymizer,
            phase: StagePhase::AwaitPageCount,
            report,
        }
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    pub fn table(&self) -> &TableSchema {
        &self.table
    }

    fn enter(&mut self, next: StagePhase) {
        tracing::trace!(
            table = %self.table.name,
            from = %self.phase,
            to = %next,
            "phase change"
        );
        self.phase = next;
    }

    /// Run both passes, executing DDL and DML through `exec`.
    pub fn stage(mut self, exec: &mut dyn SqlExecutor) -> TableOutcome {
        tracing::info!(table = %self.table.name, "staging table");
        match self.run(exec) {
            Ok(Some(reason)) => {
                self.enter(StagePhase::Skipped);
                tracing::warn!(table = %self.table.name, %reason, "table skipped");
                TableOutcome::Skipped {
                    table: self.table.name,
                    reason,
                }
            }
            Ok(None) => {
                self.enter(StagePhase::Done);
                let report = self.report;
                tracing::info!(
                    table = %report.table,
                    pages = report.pages,
                    records = report.records_analyzed,
                    rows = report.rows_inserted,
                    statements = report.statements,
                    warnings = report.warnings.len(),
                    "table staged"
                );
                TableOutcome::Staged(report)
            }
            Err(error) => {
                let phase = self.phase;
                self.enter(StagePhase::Failed);
                tracing::error!(table = %self.table.name, %phase, %error, "staging failed");
                TableOutcome::Failed {
                    table: self.table.name,
                    error,
                }
            }
        }
    }

    /// Pass 1 only: collect statistics and infer the schema.
    ///
    /// Returns `None` when the table would be skipped.
    pub fn analyze(&mut self) -> StageResult<Option<Analysis>> {
        let pages = match self.page_files()? {
            Ok(pages) => pages,
            Err(_) => return Ok(None),
        };
        let stats = self.collect_stats(&pages)?;
        self.build_schema(&stats)?;
        Ok(Some(Analysis {
            pages,
            stats,
            columns: self.table.columns.clone(),
        }))
    }

    fn run(&mut self, exec: &mut dyn SqlExecutor) -> StageResult<Option<SkipReason>> {
        let pages = match self.page_files()? {
            Ok(pages) => pages,
            Err(reason) => return Ok(Some(reason)),
        };

        let stats = self.collect_stats(&pages)?;
        self.build_schema(&stats)?;
        drop(stats);

        self.create_table(exec)?;
        self.load(&pages, exec)?;
        self.index(exec)?;
        Ok(None)
    }

    /// AwaitPageCount: list the files to read, or why there are none.
    fn page_files(&mut self) -> StageResult<Result<PageFiles, SkipReason>> {
        if self.table.skip {
            return Ok(Err(SkipReason::NoData));
        }
        let count = match self.load_dir.read_page_count(&self.table.name)? {
            None => return Ok(Err(SkipReason::MissingPageCount)),
            Some(0) => return Ok(Err(SkipReason::NoPages)),
            Some(n) => n,
        };
        tracing::debug!(table = %self.table.name, pages = count, "page count");

        let pages =
            self.load_dir
                .page_files(&self.table.name, count, self.options.include_test_file);
        self.report.pages = pages.len();
        Ok(Ok(pages))
    }

    /// Pass1Analyze: aggregate statistics over every record.
    ///
    /// Types are inferred from the values as extracted. Redaction happens
    /// only in pass 2.
    fn collect_stats(&mut self, pages: &PageFiles) -> StageResult<FieldStats> {
        self.enter(StagePhase::Pass1Analyze);
        let mut stats = FieldStats::new();
        for page in pages.iter() {
            tracing::debug!(table = %self.table.name, page = %page.label(), "analyze");
            self.for_each_record(page.path(), |_, item| {
                if let PageItem::Record(mut value) = item {
                    record::remove_nul(&mut value);
                    stats.observe_record(&value);
                }
                Ok(())
            })?;
        }
        self.report.records_analyzed = stats.records();
        Ok(stats)
    }

    /// Pass1BuildSchema: pick a type for each field.
    fn build_schema(&mut self, stats: &FieldStats) -> StageResult<()> {
        self.enter(StagePhase::Pass1BuildSchema);
        stats.log(&self.table.name);
        let columns = infer_columns(stats).map_err(|source| StageError::Schema {
            table: self.table.name.clone(),
            source,
        })?;
        self.table.columns = columns;
        self.report.columns = self.table.columns.clone();
        Ok(())
    }

    /// Pass1CreateTable.
    fn create_table(&mut self, exec: &mut dyn SqlExecutor) -> StageResult<()> {
        self.enter(StagePhase::Pass1CreateTable);
        let n = self.provisioner().create(&self.table, exec)?;
        self.report.statements += n as u64;
        Ok(())
    }

    /// Pass2Load: encode every record and insert it in batches.
    fn load(&mut self, pages: &PageFiles, exec: &mut dyn SqlExecutor) -> StageResult<()> {
        self.enter(StagePhase::Pass2Load);
        let loading = self.table.loading_table_name();
        let dialect = self.options.dialect;
        let threshold = self.options.batch_threshold;

        for page in pages.iter() {
            tracing::debug!(table = %self.table.name, page = %page.label(), "load");
            let mut batch: Option<BatchWriter> = None;

            self.for_each_record(page.path(), |this, item| {
                match item {
                    PageItem::ArrayStart => {
                        batch = Some(BatchWriter::begin(&loading, dialect, threshold));
                    }
                    PageItem::Record(value) => {
                        let writer = batch
                            .get_or_insert_with(|| BatchWriter::begin(&loading, dialect, threshold));
                        this.load_record(value, writer, &mut *exec)?;
                    }
                    PageItem::ArrayEnd => {
                        if let Some(mut writer) = batch.take() {
                            this.finish_batch(&mut writer, &mut *exec)?;
                        }
                    }
                }
                Ok(())
            })?;

            if let Some(mut writer) = batch.take() {
                self.finish_batch(&mut writer, exec)?;
            }
        }
        Ok(())
    }

    fn load_record(
        &mut self,
        mut value: Value,
        writer: &mut BatchWriter,
        exec: &mut dyn SqlExecutor,
    ) -> StageResult<()> {
        record::remove_nul(&mut value);
        self.anonymizer.anonymize(&self.table.name, &mut value);
        record::canonicalize(&mut value);

        let encoder = RowEncoder::new(&self.table, self.options.dialect, self.options.tenant_id);
        let encoded = encoder.encode(&value)?;
        self.report.warnings.extend(encoded.warnings);
        writer.push(&encoded.row, exec)?;
        Ok(())
    }

    fn finish_batch(&mut self, writer: &mut BatchWriter, exec: &mut dyn SqlExecutor) -> StageResult<()> {
        writer.finish(exec)?;
        self.report.rows_inserted += writer.rows();
        self.report.statements += writer.statements();
        Ok(())
    }

    /// Pass2Index.
    fn index(&mut self, exec: &mut dyn SqlExecutor) -> StageResult<()> {
        self.enter(StagePhase::Pass2Index);
        let n = self.provisioner().index(&self.table, exec)?;
        self.report.statements += n as u64;
        Ok(())
    }

    fn provisioner(&self) -> TableProvisioner {
        TableProvisioner::new(self.options.dialect, self.options.provision.clone())
    }

    /// Stream one page file, handing each item to `f`.
    fn for_each_record<F>(&mut self, path: &Path, mut f: F) -> StageResult<()>
    where
        F: FnMut(&mut Self, PageItem) -> StageResult<()>,
    {
        let parse_error = |source: ParseError| StageError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let stream = RecordStream::open(path).map_err(parse_error)?;
        for item in stream {
            f(self, item.map_err(parse_error)?)?;
        }
        Ok(())
    }
}

// ============================================================================
// Multi-table driver
// ============================================================================

/// What to do after a table fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuePolicy {
    /// Stage the remaining tables.
    #[default]
    Continue,
    /// Stop the run.
    Abort,
}

/// Stage each table in order, independently of the others.
pub fn stage_tables(
    tables: impl IntoIterator<Item = TableSchema>,
    load_dir: &LoadDir,
    options: &StageOptions,
    anonymizer: &Anonymizer,
    exec: &mut dyn SqlExecutor,
    policy: ContinuePolicy,
) -> Vec<TableOutcome> {
    let mut outcomes = Vec::new();
    for table in tables {
        let outcome = TableStager::new(table, load_dir, options, anonymizer).stage(exec);
        let stop = outcome.is_failed() && policy == ContinuePolicy::Abort;
        outcomes.push(outcome);
        if stop {
            tracing::warn!("aborting run after failed table");
            break;
        }
    }
    outcomes
}
