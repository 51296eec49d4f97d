//! DDL (Data Definition Language) support.
//!
//! Builders for the statements that provision a loading table: CREATE TABLE,
//! ALTER TABLE ... ADD PRIMARY KEY, CREATE INDEX, COMMENT ON TABLE and GRANT.
//!
//! # Examples
//!
//! ```ignore
//! use ldp_stage::sql::ddl::{CreateTable, ColumnDef, DataType};
//! use ldp_stage::sql::types::ColumnType;
//! use ldp_stage::sql::dialect::Dialect;
//!
//! let table = CreateTable::new("users_loading")
//!     .column(ColumnDef::new("id", DataType::Column(ColumnType::Id)).not_null())
//!     .column(ColumnDef::new("data", DataType::Json));
//!
//! println!("{}", table.to_sql(Dialect::Postgres));
//! ```

use super::dialect::{Dialect, SqlDialect};
use super::token::{Token, TokenStream};
use super::types::ColumnType;

/// DDL statement types.
#[derive(Debug, Clone)]
pub enum DdlStatement {
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    CreateIndex(CreateIndex),
    CommentOnTable(CommentOnTable),
    Grant(Grant),
}

impl DdlStatement {
    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        match self {
            DdlStatement::CreateTable(ct) => ct.to_tokens(dialect),
            DdlStatement::AlterTable(at) => at.to_tokens(dialect),
            DdlStatement::CreateIndex(ci) => ci.to_tokens(dialect),
            DdlStatement::CommentOnTable(c) => c.to_tokens(dialect),
            DdlStatement::Grant(g) => g.to_tokens(dialect),
        }
    }
}

impl From<CreateTable> for DdlStatement {
    fn from(v: CreateTable) -> Self {
        DdlStatement::CreateTable(v)
    }
}

impl From<AlterTable> for DdlStatement {
    fn from(v: AlterTable) -> Self {
        DdlStatement::AlterTable(v)
    }
}

impl From<CreateIndex> for DdlStatement {
    fn from(v: CreateIndex) -> Self {
        DdlStatement::CreateIndex(v)
    }
}

impl From<CommentOnTable> for DdlStatement {
    fn from(v: CommentOnTable) -> Self {
        DdlStatement::CommentOnTable(v)
    }
}

impl From<Grant> for DdlStatement {
    fn from(v: Grant) -> Self {
        DdlStatement::Grant(v)
    }
}

// ============================================================================
// Data types
// ============================================================================

/// Column data type as written in DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// An inferred (or fixed) staged column type.
    Column(ColumnType),
    /// The document column; spelling depends on the dialect.
    Json,
    /// Small integer, used for the tenant column.
    SmallInt,
}

impl DataType {
    /// Emit the type for a dialect.
    pub fn emit(&self, dialect: Dialect) -> String {
        match self {
            DataType::Column(ty) => dialect.emit_column_type(*ty),
            DataType::Json => dialect.json_type().into(),
            DataType::SmallInt => "SMALLINT".into(),
        }
    }
}

// ============================================================================
// CREATE TABLE
// ============================================================================

/// CREATE TABLE statement.
///
/// Columns are written one per line so the statement reads well in logs.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub distribution_key: Option<String>,
}

impl CreateTable {
    /// Create a new CREATE TABLE statement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            distribution_key: None,
        }
    }

    /// Add a column definition.
    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    /// Add multiple column definitions.
    pub fn columns(mut self, cols: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(cols);
        self
    }

    /// Distribute and sort by this column where the dialect supports it.
    pub fn distribute_by(mut self, column: impl Into<String>) -> Self {
        self.distribution_key = Some(column.into());
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Create).space().push(Token::Table).space();
        ts.push(Token::Ident(self.name.clone()));
        ts.space().lparen();

        let mut first = true;
        for col in &self.columns {
            if !first {
                ts.comma();
            }
            first = false;
            ts.newline().indent(1).append(&col.to_tokens(dialect));
        }
        ts.newline().rparen();

        if let Some(clause) = self
            .distribution_key
            .as_deref()
            .and_then(|key| dialect.distribution_clause(key))
        {
            ts.space().push(Token::Raw(clause));
        }

        ts
    }
}

// ============================================================================
// Column Definition
// ============================================================================

/// Column definition for CREATE TABLE.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
}

impl ColumnDef {
    /// Create a new column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            not_null: false,
        }
    }

    /// Mark column as NOT NULL.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Ident(self.name.clone()))
            .space()
            .push(Token::Raw(self.data_type.emit(dialect)));

        if self.not_null {
            ts.space().push(Token::Not).space().push(Token::Null);
        }

        ts
    }
}

// ============================================================================
// ALTER TABLE
// ============================================================================

/// ALTER TABLE statement.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct AlterTable {
    pub name: String,
    pub actions: Vec<AlterAction>,
}

impl AlterTable {
    /// Create a new ALTER TABLE statement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    /// Add a primary key over the given columns.
    pub fn add_primary_key(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.actions.push(AlterAction::AddPrimaryKey(
            columns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Alter).space().push(Token::Table).space();
        ts.push(Token::Ident(self.name.clone()));

        let mut first = true;
        for action in &self.actions {
            if !first {
                ts.comma();
            }
            first = false;
            ts.space().append(&action.to_tokens(dialect));
        }

        ts
    }
}

/// ALTER TABLE actions.
#[derive(Debug, Clone)]
pub enum AlterAction {
    AddPrimaryKey(Vec<String>),
}

impl AlterAction {
    /// Convert to token stream.
    pub fn to_tokens(&self, _dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        match self {
            AlterAction::AddPrimaryKey(columns) => {
                ts.push(Token::Add)
                    .space()
                    .push(Token::Primary)
                    .space()
                    .push(Token::Key)
                    .space();
                emit_column_list(&mut ts, columns);
            }
        }

        ts
    }
}

// ============================================================================
// CREATE INDEX
// ============================================================================

/// CREATE INDEX statement. The backend picks the index name.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateIndex {
    pub table: String,
    pub columns: Vec<String>,
}

impl CreateIndex {
    /// Create an index on a table.
    pub fn on(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Add an indexed column.
    pub fn column(mut self, col: impl Into<String>) -> Self {
        self.columns.push(col.into());
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, _dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Create)
            .space()
            .push(Token::Index)
            .space()
            .push(Token::On)
            .space();
        ts.push(Token::Ident(self.table.clone()));
        ts.space();
        emit_column_list(&mut ts, &self.columns);

        ts
    }
}

// ============================================================================
// COMMENT ON TABLE
// ============================================================================

/// COMMENT ON TABLE statement.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CommentOnTable {
    pub table: String,
    pub comment: String,
}

impl CommentOnTable {
    /// Create a new COMMENT ON TABLE statement.
    pub fn new(table: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            comment: comment.into(),
        }
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, _dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Comment)
            .space()
            .push(Token::On)
            .space()
            .push(Token::Table)
            .space();
        ts.push(Token::Ident(self.table.clone()));
        ts.space()
            .push(Token::Is)
            .space()
            .push(Token::LitString(self.comment.clone()));

        ts
    }
}

// ============================================================================
// GRANT
// ============================================================================

/// GRANT SELECT ON a table to a role.
#[derive(Debug, Clone)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct Grant {
    pub table: String,
    pub role: String,
}

impl Grant {
    /// Grant read access on `table` to `role`.
    pub fn select(table: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            role: role.into(),
        }
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, _dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Grant)
            .space()
            .push(Token::Select)
            .space()
            .push(Token::On)
            .space();
        ts.push(Token::Ident(self.table.clone()));
        ts.space()
            .push(Token::To)
            .space()
            .push(Token::Ident(self.role.clone()));

        ts
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Emit a parenthesized, comma-separated list of column identifiers.
fn emit_column_list(ts: &mut TokenStream, columns: &[String]) {
    ts.lparen();
    for (i, col) in columns.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.push(Token::Ident(col.clone()));
    }
    ts.rparen();
}
