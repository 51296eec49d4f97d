//! The SQL execution capability used by staging.
//!
//! Staging only ever asks for one thing: run this statement inside the
//! caller's open transaction. Statements are passed without a trailing
//! semicolon.

use std::io::Write;

use super::error::{ExecError, ExecResult};

/// Executes SQL statements.
pub trait SqlExecutor {
    fn execute(&mut self, sql: &str) -> ExecResult<()>;
}

impl<T: SqlExecutor + ?Sized> SqlExecutor for &mut T {
    fn execute(&mut self, sql: &str) -> ExecResult<()> {
        (**self).execute(sql)
    }
}

impl<T: SqlExecutor + ?Sized> SqlExecutor for Box<T> {
    fn execute(&mut self, sql: &str) -> ExecResult<()> {
        (**self).execute(sql)
    }
}

/// Writes each statement, terminated with `;`, to a script.
pub struct ScriptExecutor<W: Write> {
    out: W,
    statements: usize,
}

impl<W: Write> ScriptExecutor<W> {
    pub fn new(out: W) -> Self {
        Self { out, statements: 0 }
    }

    /// Number of statements written.
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> ExecResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> SqlExecutor for ScriptExecutor<W> {
    fn execute(&mut self, sql: &str) -> ExecResult<()> {
        self.out.write_all(sql.as_bytes())?;
        self.out.write_all(b";\n")?;
        self.statements += 1;
        Ok(())
    }
}

/// Keeps every statement in memory. Can be told to fail the n-th statement.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    pub statements: Vec<String>,
    fail_at: Option<usize>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the statement with this zero-based index.
    pub fn failing_at(index: usize) -> Self {
        Self {
            statements: Vec::new(),
            fail_at: Some(index),
        }
    }

    /// Statements starting with `prefix`.
    pub fn starting_with<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.statements.iter().filter(move |s| s.starts_with(prefix))
    }
}

impl SqlExecutor for RecordingExecutor {
    fn execute(&mut self, sql: &str) -> ExecResult<()> {
        if self.fail_at == Some(self.statements.len()) {
            return Err(ExecError::failed(format!(
                "rejected statement #{}",
                self.statements.len()
            )));
        }
        self.statements.push(sql.to_string());
        Ok(())
    }
}
