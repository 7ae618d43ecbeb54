//! Factory trait for reverse-engineering a database into a [`DatabaseModel`]

use crate::database_model::{DatabaseModel, DatabaseTable};
use serde::{Deserialize, Serialize};

/// Selects which tables a factory reads
///
/// Tables are matched by bare name or `schema.name`. A table is included when
/// it is listed in `tables` or its schema is listed in `schemas`; both empty
/// selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseModelFactoryOptions {
    #[serde(default)]
    pub tables: Vec<String>,

    #[serde(default)]
    pub schemas: Vec<String>,
}

impl DatabaseModelFactoryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.tables.push(table.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schemas.push(schema.into());
        self
    }

    pub fn selects_all(&self) -> bool {
        self.tables.is_empty() && self.schemas.is_empty()
    }

    pub fn includes(&self, table: &DatabaseTable) -> bool {
        if self.selects_all() {
            return true;
        }

        let fqn = table.table_ref().fqn();
        let by_table = self.tables.iter().any(|t| *t == table.name || *t == fqn);
        let by_schema = table
            .schema
            .as_deref()
            .is_some_and(|schema| self.schemas.iter().any(|s| s == schema));

        by_table || by_schema
    }
}

/// Errors that can occur while building a database model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScaffoldError {
    #[error("Column '{column}' already exists on table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Table '{0}' already exists in the model")]
    DuplicateTable(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Source of reverse-engineered database models
#[async_trait::async_trait]
pub trait DatabaseModelFactory: Send + Sync {
    /// Provider name (e.g., "SqlServer", "Mock")
    fn name(&self) -> &'static str;

    /// Read the tables selected by `options`
    async fn create(&self, options: &DatabaseModelFactoryOptions) -> Result<DatabaseModel, ScaffoldError>;

    /// Check credentials and reachability before reading anything
    async fn test_connection(&self) -> Result<(), ScaffoldError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_select_everything() {
        let options = DatabaseModelFactoryOptions::new();
        assert!(options.selects_all());
        assert!(options.includes(&DatabaseTable::new(Some("dbo"), "Orders")));
        assert!(options.includes(&DatabaseTable::new(None, "Orders")));
    }

    #[test]
    fn tables_match_by_name_or_qualified_name() {
        let options = DatabaseModelFactoryOptions::new()
            .with_table("Orders")
            .with_table("sales.Customers");

        assert!(options.includes(&DatabaseTable::new(Some("dbo"), "Orders")));
        assert!(options.includes(&DatabaseTable::new(Some("sales"), "Customers")));
        assert!(!options.includes(&DatabaseTable::new(Some("dbo"), "Customers")));
    }

    #[test]
    fn schema_selection_adds_to_table_selection() {
        let options = DatabaseModelFactoryOptions::new()
            .with_table("Orders")
            .with_schema("audit");

        assert!(options.includes(&DatabaseTable::new(Some("dbo"), "Orders")));
        assert!(options.includes(&DatabaseTable::new(Some("audit"), "Log")));
        assert!(!options.includes(&DatabaseTable::new(Some("dbo"), "Log")));
        assert!(!options.includes(&DatabaseTable::new(None, "Log")));
    }

    #[test]
    fn errors_render_their_context() {
        let err = ScaffoldError::DuplicateColumn {
            table: "dbo.Orders".to_string(),
            column: "Id".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'Id' already exists on table 'dbo.Orders'");
        assert_eq!(
            ScaffoldError::TableNotFound("dbo.Missing".to_string()).to_string(),
            "Table not found: dbo.Missing"
        );
    }
}
