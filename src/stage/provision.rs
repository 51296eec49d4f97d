//! Table Provisioner.
//!
//! Creates a table's loading table from its inferred schema, documents it,
//! grants read access, and indexes it once loaded.

use super::error::ExecResult;
use super::exec::SqlExecutor;
use crate::schema::table::{TableSchema, DATA_COLUMN, ID_FIELD, TENANT_COLUMN};
use crate::sql::ddl::{
    AlterTable, ColumnDef, CommentOnTable, CreateIndex, CreateTable, DataType, DdlStatement, Grant,
};
use crate::sql::dialect::{Dialect, SqlDialect};
use crate::sql::types::ColumnType;

/// Default base URL of the API reference, completed with the module name.
pub const DEFAULT_API_REFERENCE_URL: &str = "https://dev.folio.org/reference/api/#";

/// Module whose tables are left without a comment.
pub const DEFAULT_COMMENT_EXEMPT_MODULE: &str = "mod-agreements";

/// Roles and comment settings used when provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Role granted SELECT second.
    pub ldp_user: String,
    /// Role granted SELECT first.
    pub ldpconfig_user: String,
    pub comment_exempt_module: Option<String>,
    pub api_reference_url: String,
}

impl Default for ProvisionOptions {
    fn default() -> Self {
        Self {
            ldp_user: "ldp".to_string(),
            ldpconfig_user: "ldpconfig".to_string(),
            comment_exempt_module: Some(DEFAULT_COMMENT_EXEMPT_MODULE.to_string()),
            api_reference_url: DEFAULT_API_REFERENCE_URL.to_string(),
        }
    }
}

/// Builds and runs provisioning DDL for one dialect.
#[derive(Debug, Clone)]
pub struct TableProvisioner {
    dialect: Dialect,
    options: ProvisionOptions,
}

impl TableProvisioner {
    pub fn new(dialect: Dialect, options: ProvisionOptions) -> Self {
        Self { dialect, options }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The loading table's CREATE TABLE statement.
    pub fn create_table(&self, table: &TableSchema) -> CreateTable {
        CreateTable::new(table.loading_table_name())
            .column(ColumnDef::new(ID_FIELD, DataType::Column(ColumnType::Id)).not_null())
            .columns(
                table
                    .value_columns()
                    .map(|c| ColumnDef::new(&c.name, DataType::Column(c.column_type))),
            )
            .column(ColumnDef::new(DATA_COLUMN, DataType::Json))
            .column(ColumnDef::new(TENANT_COLUMN, DataType::SmallInt).not_null())
            .distribute_by(ID_FIELD)
    }

    /// Comment describing where the table's records come from.
    pub fn comment_text(&self, table: &TableSchema) -> Option<String> {
        if self.options.comment_exempt_module.as_deref() == Some(table.module.as_str()) {
            return None;
        }
        Some(format!(
            "{} in {}: {}{}",
            table.source_path, table.module, self.options.api_reference_url, table.module
        ))
    }

    /// Statements that create, document and grant the loading table.
    pub fn create_statements(&self, table: &TableSchema) -> Vec<DdlStatement> {
        let loading = table.loading_table_name();
        let mut statements = vec![DdlStatement::from(self.create_table(table))];
        if let Some(comment) = self.comment_text(table) {
            statements.push(CommentOnTable::new(&loading, comment).into());
        }
        statements.push(Grant::select(&loading, &self.options.ldpconfig_user).into());
        statements.push(Grant::select(&loading, &self.options.ldp_user).into());
        statements
    }

    /// Statements that index the loaded table.
    ///
    /// The identifier always becomes the primary key. Other columns get a
    /// secondary index where the dialect supports one.
    pub fn index_statements(&self, table: &TableSchema) -> Vec<DdlStatement> {
        let loading = table.loading_table_name();
        let mut statements = vec![DdlStatement::from(
            AlterTable::new(&loading).add_primary_key([ID_FIELD]),
        )];
        if self.dialect.supports_secondary_indexes() {
            statements.extend(
                table
                    .value_columns()
                    .map(|c| CreateIndex::on(&loading).column(&c.name).into()),
            );
        }
        statements
    }

    /// Create the loading table.
    pub fn create(&self, table: &TableSchema, exec: &mut dyn SqlExecutor) -> ExecResult<usize> {
        tracing::debug!(table = %table.name, "creating loading table");
        self.run(self.create_statements(table), exec)
    }

    /// Index the loading table.
    pub fn index(&self, table: &TableSchema, exec: &mut dyn SqlExecutor) -> ExecResult<usize> {
        tracing::trace!(table = %table.name, "creating indexes");
        self.run(self.index_statements(table), exec)
    }

    fn run(&self, statements: Vec<DdlStatement>, exec: &mut dyn SqlExecutor) -> ExecResult<usize> {
        let n = statements.len();
        for statement in statements {
            let sql = statement.to_sql(self.dialect);
            tracing::debug!("{sql}");
            exec.execute(&sql)?;
        }
        Ok(n)
    }
}
