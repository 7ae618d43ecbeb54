//! Physical store object identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Kind of physical object a logical entity can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreObjectKind {
    /// Base table
    Table,

    /// View
    View,

    /// Table-valued database function
    Function,

    /// Ad-hoc SQL query
    SqlQuery,
}

impl fmt::Display for StoreObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::View => write!(f, "view"),
            Self::Function => write!(f, "function"),
            Self::SqlQuery => write!(f, "sql_query"),
        }
    }
}

/// Errors raised when building a store object identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreObjectError {
    #[error("Store object name cannot be empty")]
    EmptyName,
}

#[derive(Deserialize)]
struct RawStoreObject {
    kind: StoreObjectKind,
    name: String,
    #[serde(default)]
    schema: Option<String>,
}

/// Canonical identity of a physical schema object
///
/// Tables compare case-insensitively on name and schema. Other kinds compare
/// exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawStoreObject")]
pub struct StoreObjectIdentifier {
    kind: StoreObjectKind,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
}

impl TryFrom<RawStoreObject> for StoreObjectIdentifier {
    type Error = StoreObjectError;

    fn try_from(raw: RawStoreObject) -> Result<Self, Self::Error> {
        Self::new(raw.kind, raw.name, raw.schema)
    }
}

impl StoreObjectIdentifier {
    /// Create an identifier of the given kind
    pub fn new(
        kind: StoreObjectKind,
        name: impl Into<String>,
        schema: Option<String>,
    ) -> Result<Self, StoreObjectError> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreObjectError::EmptyName);
        }

        Ok(Self {
            kind,
            name,
            schema: schema.filter(|s| !s.is_empty()),
        })
    }

    /// Identifier for a table
    pub fn table(name: impl Into<String>, schema: Option<&str>) -> Result<Self, StoreObjectError> {
        Self::new(StoreObjectKind::Table, name, schema.map(str::to_string))
    }

    /// Identifier for a view
    pub fn view(name: impl Into<String>, schema: Option<&str>) -> Result<Self, StoreObjectError> {
        Self::new(StoreObjectKind::View, name, schema.map(str::to_string))
    }

    /// Identifier for a database function
    pub fn function(name: impl Into<String>) -> Result<Self, StoreObjectError> {
        Self::new(StoreObjectKind::Function, name, None)
    }

    /// Identifier for a SQL query
    pub fn sql_query(name: impl Into<String>) -> Result<Self, StoreObjectError> {
        Self::new(StoreObjectKind::SqlQuery, name, None)
    }

    pub fn kind(&self) -> StoreObjectKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Schema-qualified display name (`schema.name` or `name`)
    pub fn display_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }

    fn folds_case(&self) -> bool {
        self.kind == StoreObjectKind::Table
    }
}

fn eq_ignore_case_opt(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase() == b.to_lowercase(),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for StoreObjectIdentifier {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }

        if self.folds_case() {
            eq_ignore_case_opt(Some(&self.name), Some(&other.name))
                && eq_ignore_case_opt(self.schema(), other.schema())
        } else {
            self.name == other.name && self.schema == other.schema
        }
    }
}

impl Eq for StoreObjectIdentifier {}

impl Hash for StoreObjectIdentifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        if self.folds_case() {
            self.name.to_lowercase().hash(state);
            self.schema.as_ref().map(|s| s.to_lowercase()).hash(state);
        } else {
            self.name.hash(state);
            self.schema.hash(state);
        }
    }
}

impl fmt::Display for StoreObjectIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
