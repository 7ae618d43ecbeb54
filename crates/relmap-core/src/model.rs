//! Logical model: entity types, properties and foreign keys
//!
//! The serialized [`Model`] is what users declare. [`ForeignKeyDescriptor`] is
//! the resolved, read-only view of one foreign key that the engine compares.
//! Descriptors borrow from the model and are re-derived whenever it changes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::annotations::Annotations;
use crate::store_object::{StoreObjectError, StoreObjectIdentifier};

/// Action taken on dependents when the principal row is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteBehavior {
    Cascade,
    Restrict,
    SetNull,
    NoAction,
    /// Nulls out tracked dependents on the client, NO ACTION in the database
    #[default]
    ClientSetNull,
    /// Deletes tracked dependents on the client, NO ACTION in the database
    ClientCascade,
    ClientNoAction,
}

impl fmt::Display for DeleteBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cascade => "Cascade",
            Self::Restrict => "Restrict",
            Self::SetNull => "SetNull",
            Self::NoAction => "NoAction",
            Self::ClientSetNull => "ClientSetNull",
            Self::ClientCascade => "ClientCascade",
            Self::ClientNoAction => "ClientNoAction",
        };
        write!(f, "{}", name)
    }
}

/// Column name a property uses in one specific store object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOverride {
    pub store_object: StoreObjectIdentifier,
    pub column_name: String,
}

/// A scalar property of an entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name
    pub name: String,

    /// Explicit column name, used in every store object without an override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,

    /// Per store object column names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ColumnOverride>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_name: None,
            overrides: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// Set the explicit column name
    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    /// Map this property to a different column in one store object
    pub fn with_override(mut self, store_object: StoreObjectIdentifier, column_name: impl Into<String>) -> Self {
        self.overrides.push(ColumnOverride {
            store_object,
            column_name: column_name.into(),
        });
        self
    }

    /// Override declared for the given store object, if any
    pub fn override_for(&self, store_object: &StoreObjectIdentifier) -> Option<&str> {
        self.overrides
            .iter()
            .find(|o| &o.store_object == store_object)
            .map(|o| o.column_name.as_str())
    }
}

/// A relationship declared on the dependent entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Dependent property names, in constraint order
    pub properties: Vec<String>,

    /// Name of the principal entity type
    pub principal_entity: String,

    /// Principal key property names; empty means the principal's primary key
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub principal_key: Vec<String>,

    #[serde(default)]
    pub is_unique: bool,

    #[serde(default)]
    pub delete_behavior: DeleteBehavior,

    /// Explicit physical constraint name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl ForeignKey {
    pub fn new<I, S>(properties: I, principal_entity: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
            principal_entity: principal_entity.into(),
            principal_key: Vec::new(),
            is_unique: false,
            delete_behavior: DeleteBehavior::default(),
            constraint_name: None,
            annotations: Annotations::new(),
        }
    }

    pub fn with_principal_key<I, S>(mut self, principal_key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.principal_key = principal_key.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unique(mut self, is_unique: bool) -> Self {
        self.is_unique = is_unique;
        self
    }

    pub fn with_delete_behavior(mut self, delete_behavior: DeleteBehavior) -> Self {
        self.delete_behavior = delete_behavior;
        self
    }

    pub fn with_constraint_name(mut self, name: impl Into<String>) -> Self {
        self.constraint_name = Some(name.into());
        self
    }
}

/// An entity type mapped to a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityType {
    /// Unique entity type name
    pub name: String,

    /// Name shown in diagnostics, defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Table name, defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Table schema, defaults to the configured default schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub properties: Vec<Property>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            table: None,
            schema: None,
            properties: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            annotations: Annotations::new(),
        }
    }

    /// Map to a table, optionally in a schema
    pub fn with_table(mut self, table: impl Into<String>, schema: Option<&str>) -> Self {
        self.table = Some(table.into());
        self.schema = schema.map(str::to_string);
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Add plain properties by name
    pub fn with_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.properties.extend(names.into_iter().map(Property::new));
        self
    }

    pub fn with_primary_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Name used in diagnostics
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Physical table name
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }

    /// Physical schema, falling back to `default_schema`
    pub fn schema_or<'a>(&'a self, default_schema: Option<&'a str>) -> Option<&'a str> {
        self.schema.as_deref().filter(|s| !s.is_empty()).or(default_schema)
    }

    /// `schema.table` or `table`
    pub fn schema_qualified_table_name(&self, default_schema: Option<&str>) -> String {
        match self.schema_or(default_schema) {
            Some(schema) => format!("{}.{}", schema, self.table_name()),
            None => self.table_name().to_string(),
        }
    }

    /// Table identifier this entity type maps to
    pub fn table_identifier(&self, default_schema: Option<&str>) -> Result<StoreObjectIdentifier, ModelError> {
        StoreObjectIdentifier::table(self.table_name(), self.schema_or(default_schema)).map_err(|source| {
            ModelError::InvalidStoreObject {
                entity: self.name.clone(),
                source,
            }
        })
    }

    /// Find a property by name
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn resolve_properties(&self, names: &[String]) -> Result<Vec<&Property>, ModelError> {
        names
            .iter()
            .map(|name| {
                self.find_property(name).ok_or_else(|| ModelError::UnknownProperty {
                    entity: self.name.clone(),
                    property: name.clone(),
                })
            })
            .collect()
    }
}

/// Errors raised while loading or resolving a model
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Entity type '{0}' is declared more than once")]
    DuplicateEntity(String),

    #[error("Entity type '{referenced_by}' references unknown entity type '{entity}'")]
    UnknownEntity { entity: String, referenced_by: String },

    #[error("Entity type '{entity}' has no property '{property}'")]
    UnknownProperty { entity: String, property: String },

    #[error("A foreign key on '{entity}' has no properties")]
    EmptyForeignKey { entity: String },

    #[error("Principal entity type '{entity}' has no primary key and the foreign key names no principal key")]
    MissingPrincipalKey { entity: String },

    #[error("A foreign key on '{entity}' has {dependent} dependent properties but {principal} principal key properties")]
    ForeignKeyArityMismatch {
        entity: String,
        dependent: usize,
        principal: usize,
    },

    #[error("Entity type '{entity}' maps to an invalid store object: {source}")]
    InvalidStoreObject {
        entity: String,
        #[source]
        source: StoreObjectError,
    },
}

/// Render properties as `{'A', 'B'}`
pub fn format_properties(properties: &[&Property]) -> String {
    format_names(properties.iter().map(|p| p.name.as_str()))
}

/// Render names as `{'a', 'b'}`
pub fn format_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = names.into_iter().map(|n| format!("'{}'", n)).collect();
    format!("{{{}}}", quoted.join(", "))
}

/// Resolved foreign key
///
/// Dependent and principal property lists are non-empty and of equal length;
/// position `i` of one corresponds to position `i` of the other.
#[derive(Debug, Clone)]
pub struct ForeignKeyDescriptor<'m> {
    declaring_entity: &'m EntityType,
    principal_entity: &'m EntityType,
    properties: Vec<&'m Property>,
    principal_key_properties: Vec<&'m Property>,
    is_unique: bool,
    delete_behavior: DeleteBehavior,
    constraint_name: Option<&'m str>,
    declaring_table: StoreObjectIdentifier,
    principal_table: StoreObjectIdentifier,
    default_schema: Option<&'m str>,
}

impl<'m> ForeignKeyDescriptor<'m> {
    /// Resolve one foreign key declared on `declaring_entity`
    pub fn resolve(
        foreign_key: &'m ForeignKey,
        declaring_entity: &'m EntityType,
        principal_entity: &'m EntityType,
        default_schema: Option<&'m str>,
    ) -> Result<Self, ModelError> {
        if foreign_key.properties.is_empty() {
            return Err(ModelError::EmptyForeignKey {
                entity: declaring_entity.name.clone(),
            });
        }

        let principal_key_names = if foreign_key.principal_key.is_empty() {
            &principal_entity.primary_key
        } else {
            &foreign_key.principal_key
        };
        if principal_key_names.is_empty() {
            return Err(ModelError::MissingPrincipalKey {
                entity: principal_entity.name.clone(),
            });
        }
        if principal_key_names.len() != foreign_key.properties.len() {
            return Err(ModelError::ForeignKeyArityMismatch {
                entity: declaring_entity.name.clone(),
                dependent: foreign_key.properties.len(),
                principal: principal_key_names.len(),
            });
        }

        Ok(Self {
            declaring_entity,
            principal_entity,
            properties: declaring_entity.resolve_properties(&foreign_key.properties)?,
            principal_key_properties: principal_entity.resolve_properties(principal_key_names)?,
            is_unique: foreign_key.is_unique,
            delete_behavior: foreign_key.delete_behavior,
            constraint_name: foreign_key.constraint_name.as_deref(),
            declaring_table: declaring_entity.table_identifier(default_schema)?,
            principal_table: principal_entity.table_identifier(default_schema)?,
            default_schema,
        })
    }

    pub fn declaring_entity(&self) -> &'m EntityType {
        self.declaring_entity
    }

    pub fn principal_entity(&self) -> &'m EntityType {
        self.principal_entity
    }

    pub fn properties(&self) -> &[&'m Property] {
        &self.properties
    }

    pub fn principal_key_properties(&self) -> &[&'m Property] {
        &self.principal_key_properties
    }

    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    pub fn delete_behavior(&self) -> DeleteBehavior {
        self.delete_behavior
    }

    /// Explicitly configured constraint name
    pub fn constraint_name(&self) -> Option<&'m str> {
        self.constraint_name
    }

    /// Table of the declaring entity type
    pub fn declaring_table(&self) -> &StoreObjectIdentifier {
        &self.declaring_table
    }

    /// Table of the principal entity type
    pub fn principal_table(&self) -> &StoreObjectIdentifier {
        &self.principal_table
    }

    /// Schema-qualified name of the declaring table
    pub fn declaring_table_name(&self) -> String {
        self.declaring_entity.schema_qualified_table_name(self.default_schema)
    }

    /// Schema-qualified name of the principal table
    pub fn principal_table_name(&self) -> String {
        self.principal_entity.schema_qualified_table_name(self.default_schema)
    }

    /// Dependent properties rendered as `{'A', 'B'}`
    pub fn format_properties(&self) -> String {
        format_properties(&self.properties)
    }
}

/// A complete logical model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub entity_types: Vec<EntityType>,
}

impl Model {
    pub fn new(entity_types: Vec<EntityType>) -> Self {
        Self { entity_types }
    }

    /// Load a model from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ModelError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Io(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Load a model from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(|e| ModelError::Parse(e.to_string()))
    }

    /// Find an entity type by name
    pub fn find_entity(&self, name: &str) -> Option<&EntityType> {
        self.entity_types.iter().find(|e| e.name == name)
    }

    /// Resolve every foreign key in declaration order
    pub fn resolve_foreign_keys<'m>(
        &'m self,
        default_schema: Option<&'m str>,
    ) -> Result<Vec<ForeignKeyDescriptor<'m>>, ModelError> {
        let mut seen = HashSet::new();
        for entity in &self.entity_types {
            if !seen.insert(entity.name.as_str()) {
                return Err(ModelError::DuplicateEntity(entity.name.clone()));
            }
        }

        let mut descriptors = Vec::new();
        for entity in &self.entity_types {
            for foreign_key in &entity.foreign_keys {
                let principal = self.find_entity(&foreign_key.principal_entity).ok_or_else(|| {
                    ModelError::UnknownEntity {
                        entity: foreign_key.principal_entity.clone(),
                        referenced_by: entity.name.clone(),
                    }
                })?;
                descriptors.push(ForeignKeyDescriptor::resolve(foreign_key, entity, principal, default_schema)?);
            }
        }

        Ok(descriptors)
    }
}
