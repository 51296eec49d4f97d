//! Table and column schemas for staged source tables.

use inflector::Inflector;

use crate::sql::types::ColumnType;

/// Name of the record identifier field.
pub const ID_FIELD: &str = "id";

/// Column holding the full JSON document.
pub const DATA_COLUMN: &str = "data";

/// Column holding the tenant marker.
pub const TENANT_COLUMN: &str = "tenant_id";

/// Suffix appended to a table name to form its loading table.
pub const LOADING_SUFFIX: &str = "_loading";

/// A logical source table and, after analysis, its inferred columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    /// Stable table name, also the prefix of its page files.
    pub name: String,
    /// API path the records were extracted from.
    pub source_path: String,
    /// Owning source module.
    pub module: String,
    /// Set when no data was found upstream.
    pub skip: bool,
    /// Inferred columns, identifier first. Empty until analysis completes.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            module: module.into(),
            skip: false,
            columns: Vec::new(),
        }
    }

    /// Name of the staging-area table loaded for this source table.
    pub fn loading_table_name(&self) -> String {
        loading_table_name(&self.name)
    }

    /// Columns other than the identifier, in order.
    pub fn value_columns(&self) -> impl Iterator<Item = &ColumnSchema> {
        self.columns
            .iter()
            .filter(|c| c.column_type != ColumnType::Id)
    }
}

/// Loading table name for a table name.
pub fn loading_table_name(table: &str) -> String {
    format!("{table}{LOADING_SUFFIX}")
}

/// One destination column and the source field it is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Destination column name.
    pub name: String,
    /// Source JSON field name, used to look values up while encoding.
    pub source_name: String,
    pub column_type: ColumnType,
}

impl ColumnSchema {
    /// Column for a source field, named by [`column_name_for`].
    pub fn for_field(source_name: impl Into<String>, column_type: ColumnType) -> Self {
        let source_name = source_name.into();
        Self {
            name: column_name_for(&source_name),
            source_name,
            column_type,
        }
    }

    /// The identifier column.
    pub fn id() -> Self {
        Self {
            name: ID_FIELD.to_string(),
            source_name: ID_FIELD.to_string(),
            column_type: ColumnType::Id,
        }
    }
}

/// Destination column name for a camelCase source field.
pub fn column_name_for(field: &str) -> String {
    field.to_snake_case()
}
