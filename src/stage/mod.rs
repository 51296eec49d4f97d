//! The two-pass staging engine.
//!
//! Pass 1 reads every page of a table to collect per-field statistics, infers
//! the column schema and creates the loading table. Pass 2 reads the pages
//! again and inserts each record, then indexes the table.
//!
//! - [`orchestrator`] - per-table state machine and multi-table driver
//! - [`record`] - canonical member order and serialization
//! - [`anonymize`] - redaction of personal data
//! - [`encode`] - JSON values to SQL literals
//! - [`batch`] - size-bounded INSERT batches
//! - [`provision`] - table DDL, grants and indexes
//! - [`files`] - load-directory layout
//! - [`exec`] - the SQL execution capability

pub mod anonymize;
pub mod batch;
pub mod encode;
pub mod error;
pub mod exec;
pub mod files;
pub mod orchestrator;
pub mod provision;
pub mod record;

pub use anonymize::{Anonymizer, NoPersonalData, PathClassifier, PersonalDataClassifier};
pub use batch::{BatchWriter, DEFAULT_BATCH_THRESHOLD};
pub use encode::{DataWarning, EncodedRow, RowEncoder, WarningKind};
pub use error::{ExecError, ExecResult, StageError, StageResult};
pub use exec::{RecordingExecutor, ScriptExecutor, SqlExecutor};
pub use files::{LoadDir, PageFile, PageFiles};
pub use orchestrator::{
    stage_tables, Analysis, ContinuePolicy, SkipReason, StageOptions, StagePhase, StageReport,
    TableOutcome, TableStager,
};
pub use provision::{ProvisionOptions, TableProvisioner};
