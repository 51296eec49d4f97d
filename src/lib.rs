//! # ldp-stage
//!
//! Stages paginated JSON records extracted from a multi-tenant REST service
//! into typed SQL loading tables.
//!
//! ## Architecture
//!
//! Each table is staged in two passes over its page files:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          Page files  (<table>_0.json, <table>_1.json)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [json: streaming reconstructor]
//! ┌─────────────────────────────────────────────────────────┐
//! │             One record at a time (serde_json)            │
//! └─────────────────────────────────────────────────────────┘
//!          │ pass 1                          │ pass 2
//!          ▼ [schema: stats]                 ▼ [stage: anonymize,
//! ┌──────────────────────┐                   │  canonicalize, encode]
//! │ FieldStats → columns │                   ▼
//! └──────────────────────┘        ┌──────────────────────┐
//!          │ [stage: provision]   │ batched INSERT       │
//!          ▼                      └──────────────────────┘
//! ┌─────────────────────────────────────────────────────────┐
//! │          SqlExecutor  (script file or live connection)   │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod json;
pub mod schema;
pub mod sql;
pub mod stage;

// Re-export SQL submodules at crate level
pub use sql::ddl;
pub use sql::dialect;
pub use sql::dml;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::json::{PageItem, RecordStream};
    pub use crate::schema::{Catalog, ColumnSchema, FieldStats, TableSchema};
    pub use crate::sql::ColumnType;
    pub use crate::stage::{
        stage_tables, Anonymizer, ContinuePolicy, LoadDir, ScriptExecutor, SqlExecutor,
        StageError, StageOptions, StageReport, TableOutcome, TableStager,
    };
    pub use crate::token::{Token, TokenStream};
}

// Also export at crate root for convenience
pub use dialect::Dialect;
pub use stage::{stage_tables, StageOptions, TableOutcome, TableStager};
