//! Batch Insert Writer.
//!
//! Rows are appended to one open `INSERT ... VALUES` statement until its text
//! grows past a threshold, then the statement is executed and a new one is
//! started. This bounds the size of every statement sent to the backend.

use super::error::ExecResult;
use super::exec::SqlExecutor;
use crate::sql::dialect::Dialect;
use crate::sql::dml::{Insert, Row};

/// Statement size, in bytes, past which a batch is flushed.
pub const DEFAULT_BATCH_THRESHOLD: usize = 16_500_000;

/// Accumulates rows for one table into size-bounded INSERT statements.
#[derive(Debug)]
pub struct BatchWriter {
    table: String,
    dialect: Dialect,
    header: String,
    buffer: String,
    threshold: usize,
    pending: usize,
    rows: u64,
    statements: u64,
}

impl BatchWriter {
    /// Begin a batch targeting `table`.
    pub fn begin(table: impl Into<String>, dialect: Dialect, threshold: usize) -> Self {
        let table = table.into();
        let header = Insert::into(table.clone()).header_sql(dialect);
        Self {
            buffer: header.clone(),
            table,
            dialect,
            header,
            threshold,
            pending: 0,
            rows: 0,
            statements: 0,
        }
    }

    /// Append a row, flushing first when the open statement is already past
    /// the threshold.
    pub fn push(&mut self, row: &Row, exec: &mut dyn SqlExecutor) -> ExecResult<()> {
        if self.buffer.len() > self.threshold && self.pending > 0 {
            self.flush(exec)?;
        }
        if self.pending > 0 {
            self.buffer.push(',');
        }
        self.buffer.push_str(&row.to_sql(self.dialect));
        self.pending += 1;
        Ok(())
    }

    /// Execute any pending rows. Executes nothing when no row is pending.
    pub fn finish(&mut self, exec: &mut dyn SqlExecutor) -> ExecResult<()> {
        if self.pending > 0 {
            self.flush(exec)?;
        }
        Ok(())
    }

    fn flush(&mut self, exec: &mut dyn SqlExecutor) -> ExecResult<()> {
        exec.execute(&self.buffer)?;
        tracing::trace!(
            table = %self.table,
            rows = self.pending,
            bytes = self.buffer.len(),
            "insert batch executed"
        );
        self.rows += self.pending as u64;
        self.statements += 1;
        self.pending = 0;
        self.buffer.clear();
        self.buffer.push_str(&self.header);
        Ok(())
    }

    /// Rows in the open statement.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Rows executed so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// INSERT statements executed so far.
    pub fn statements(&self) -> u64 {
        self.statements
    }
}
