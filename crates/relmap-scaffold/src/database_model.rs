//! Reverse-engineered database model
//!
//! Plain data filled in by a [`DatabaseModelFactory`](crate::DatabaseModelFactory)
//! and handed to scaffolding consumers. Tables own their columns; a column only
//! remembers which table it belongs to through a [`TableRef`].

use relmap_core::{Annotations, StoreObjectError, StoreObjectIdentifier};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::factory::ScaffoldError;

/// When the database generates a column's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueGenerated {
    /// On insert
    OnAdd,

    /// On update
    OnUpdate,

    /// On insert and on update
    OnAddOrUpdate,
}

/// Non-owning reference from a column to its table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
        }
    }

    /// `schema.name` or `name`
    pub fn fqn(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    /// Table identity in the logical model's terms
    pub fn to_store_object(&self) -> Result<StoreObjectIdentifier, StoreObjectError> {
        StoreObjectIdentifier::table(self.name.clone(), self.schema.as_deref())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// A column read from an existing database
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatabaseColumn {
    /// Owning table, set when the column is added to one
    pub table: Option<TableRef>,

    /// Column name
    pub name: String,

    /// Whether the column accepts NULL
    pub is_nullable: bool,

    /// Database type, e.g. `nvarchar(max)`
    pub store_type: Option<String>,

    /// Default constraint SQL
    pub default_value_sql: Option<String>,

    /// Computed column expression
    pub computed_column_sql: Option<String>,

    /// Whether a computed value is persisted; `None` when unknown or not computed
    pub is_stored: Option<bool>,

    pub comment: Option<String>,

    pub collation: Option<String>,

    /// When the database generates the value; `None` when it never does
    pub value_generated: Option<ValueGenerated>,

    pub annotations: Annotations,
}

impl DatabaseColumn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    pub fn with_store_type(mut self, store_type: impl Into<String>) -> Self {
        self.store_type = Some(store_type.into());
        self
    }

    pub fn with_default_value_sql(mut self, sql: impl Into<String>) -> Self {
        self.default_value_sql = Some(sql.into());
        self
    }

    /// Mark as computed; `is_stored` is `None` when the database does not say
    pub fn with_computed_column_sql(mut self, sql: impl Into<String>, is_stored: Option<bool>) -> Self {
        self.computed_column_sql = Some(sql.into());
        self.is_stored = is_stored;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn with_value_generated(mut self, value_generated: ValueGenerated) -> Self {
        self.value_generated = Some(value_generated);
        self
    }

    pub fn is_computed(&self) -> bool {
        self.computed_column_sql.is_some()
    }
}

impl fmt::Display for DatabaseColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<UNKNOWN>")
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A table read from an existing database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseTable {
    pub schema: Option<String>,
    pub name: String,
    pub comment: Option<String>,
    columns: Vec<DatabaseColumn>,
    pub annotations: Annotations,
}

impl DatabaseTable {
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.into(),
            comment: None,
            columns: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Reference other model elements can hold to this table
    pub fn table_ref(&self) -> TableRef {
        TableRef::new(self.schema.as_deref(), self.name.clone())
    }

    /// Add a column, rejecting duplicate names
    pub fn add_column(&mut self, mut column: DatabaseColumn) -> Result<&mut DatabaseColumn, ScaffoldError> {
        if self.column(&column.name).is_some() {
            return Err(ScaffoldError::DuplicateColumn {
                table: self.table_ref().fqn(),
                column: column.name,
            });
        }

        column.table = Some(self.table_ref());
        self.columns.push(column);
        let last = self.columns.len() - 1;
        Ok(&mut self.columns[last])
    }

    /// Builder form of [`add_column`](Self::add_column)
    pub fn with_column(mut self, column: DatabaseColumn) -> Result<Self, ScaffoldError> {
        self.add_column(column)?;
        Ok(self)
    }

    /// Columns in ordinal order
    pub fn columns(&self) -> &[DatabaseColumn] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&DatabaseColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

impl fmt::Display for DatabaseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table_ref())
    }
}

/// Everything a factory read from one database
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatabaseModel {
    pub database_name: Option<String>,
    pub default_schema: Option<String>,
    tables: Vec<DatabaseTable>,
    pub annotations: Annotations,
}

impl DatabaseModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, rejecting a second table with the same schema and name
    pub fn add_table(&mut self, table: DatabaseTable) -> Result<(), ScaffoldError> {
        if self.find_table(table.schema.as_deref(), &table.name).is_some() {
            return Err(ScaffoldError::DuplicateTable(table.table_ref().fqn()));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn tables(&self) -> &[DatabaseTable] {
        &self.tables
    }

    pub fn find_table(&self, schema: Option<&str>, name: &str) -> Option<&DatabaseTable> {
        self.tables
            .iter()
            .find(|t| t.schema.as_deref() == schema && t.name == name)
    }

    /// Resolve a column's back-reference
    pub fn table_of(&self, column: &DatabaseColumn) -> Option<&DatabaseTable> {
        let table = column.table.as_ref()?;
        self.find_table(table.schema.as_deref(), &table.name)
    }
}
