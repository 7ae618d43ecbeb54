//! Mock database model factory for testing
//!
//! Returns predefined tables without connecting to any database. Useful for
//! exercising scaffolding consumers and simulating provider failures.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relmap_scaffold::{DatabaseColumn, DatabaseModelFactory, DatabaseModelFactoryOptions,
//!     DatabaseTable, MockDatabaseModelFactory};
//!
//! let factory = MockDatabaseModelFactory::new();
//! let table = DatabaseTable::new(Some("dbo"), "Orders")
//!     .with_column(DatabaseColumn::new("Id"))?;
//! factory.add_table(table).await;
//!
//! let model = factory.create(&DatabaseModelFactoryOptions::new()).await?;
//! ```
//!
//! ## Simulating Failures
//!
//! ```rust,ignore
//! let factory = MockDatabaseModelFactory::new().with_connection_failure();
//! assert!(factory.test_connection().await.is_err());
//!
//! let factory = MockDatabaseModelFactory::new().with_latency(100); // 100ms delay
//! ```

use crate::database_model::{DatabaseModel, DatabaseTable};
use crate::factory::{DatabaseModelFactory, DatabaseModelFactoryOptions, ScaffoldError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory [`DatabaseModelFactory`]
///
/// Tables are keyed by `schema.name` and returned in key order. Clones share
/// the same table and error maps.
pub struct MockDatabaseModelFactory {
    tables: Arc<RwLock<BTreeMap<String, DatabaseTable>>>,

    /// Errors returned when a specific table is selected
    errors: Arc<RwLock<HashMap<String, ScaffoldError>>>,

    database_name: Option<String>,
    default_schema: Option<String>,
    fail_connection: bool,

    /// Simulated query latency (milliseconds)
    latency_ms: u64,

    factory_name: &'static str,
}

impl MockDatabaseModelFactory {
    pub fn new() -> Self {
        MockDatabaseModelFactoryBuilder::new().build()
    }

    /// Add or replace a table
    pub async fn add_table(&self, table: DatabaseTable) {
        self.tables.write().await.insert(table.table_ref().fqn(), table);
    }

    /// Fail [`create`](DatabaseModelFactory::create) whenever `fqn` is selected
    pub async fn add_error_for_table(&self, fqn: impl Into<String>, error: ScaffoldError) {
        self.errors.write().await.insert(fqn.into(), error);
    }

    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Set a custom factory name, e.g. to stand in for a specific provider
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.factory_name = name;
        self
    }

    pub async fn table_count(&self) -> usize {
        self.tables.read().await.len()
    }

    pub async fn has_table(&self, fqn: &str) -> bool {
        self.tables.read().await.contains_key(fqn)
    }

    pub async fn clear_tables(&self) {
        self.tables.write().await.clear();
    }

    pub async fn clear_errors(&self) {
        self.errors.write().await.clear();
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

impl Default for MockDatabaseModelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockDatabaseModelFactory {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            errors: Arc::clone(&self.errors),
            database_name: self.database_name.clone(),
            default_schema: self.default_schema.clone(),
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            factory_name: self.factory_name,
        }
    }
}

#[async_trait::async_trait]
impl DatabaseModelFactory for MockDatabaseModelFactory {
    fn name(&self) -> &'static str {
        self.factory_name
    }

    async fn create(&self, options: &DatabaseModelFactoryOptions) -> Result<DatabaseModel, ScaffoldError> {
        self.simulate_latency().await;

        if self.fail_connection {
            return Err(ScaffoldError::Connection("Simulated connection failure".to_string()));
        }

        let tables = self.tables.read().await;
        let errors = self.errors.read().await;

        let mut model = DatabaseModel::new();
        model.database_name = self.database_name.clone();
        model.default_schema = self.default_schema.clone();

        for (fqn, table) in tables.iter() {
            if !options.includes(table) {
                continue;
            }
            if let Some(error) = errors.get(fqn) {
                return Err(error.clone());
            }
            model.add_table(table.clone())?;
        }

        for requested in &options.tables {
            let found = tables
                .values()
                .any(|t| t.name == *requested || t.table_ref().fqn() == *requested);
            if !found {
                tracing::warn!(table = %requested, "Requested table was not found in the database");
            }
        }

        tracing::debug!(
            factory = self.factory_name,
            tables = model.tables().len(),
            "Created database model"
        );

        Ok(model)
    }

    async fn test_connection(&self) -> Result<(), ScaffoldError> {
        self.simulate_latency().await;

        if self.fail_connection {
            Err(ScaffoldError::Connection("Simulated connection failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Fluent builder for a [`MockDatabaseModelFactory`] with predefined tables
///
/// ```rust,ignore
/// let factory = MockDatabaseModelFactoryBuilder::new()
///     .with_database_name("Shop")
///     .with_table(orders_table())
///     .with_error("dbo.Secrets", ScaffoldError::PermissionDenied("denied".into()))
///     .build();
/// ```
pub struct MockDatabaseModelFactoryBuilder {
    tables: BTreeMap<String, DatabaseTable>,
    errors: HashMap<String, ScaffoldError>,
    database_name: Option<String>,
    default_schema: Option<String>,
    fail_connection: bool,
    latency_ms: u64,
    factory_name: &'static str,
}

impl MockDatabaseModelFactoryBuilder {
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
            errors: HashMap::new(),
            database_name: None,
            default_schema: None,
            fail_connection: false,
            latency_ms: 0,
            factory_name: "Mock",
        }
    }

    pub fn with_table(mut self, table: DatabaseTable) -> Self {
        self.tables.insert(table.table_ref().fqn(), table);
        self
    }

    pub fn with_error(mut self, fqn: impl Into<String>, error: ScaffoldError) -> Self {
        self.errors.insert(fqn.into(), error);
        self
    }

    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.factory_name = name;
        self
    }

    pub fn build(self) -> MockDatabaseModelFactory {
        MockDatabaseModelFactory {
            tables: Arc::new(RwLock::new(self.tables)),
            errors: Arc::new(RwLock::new(self.errors)),
            database_name: self.database_name,
            default_schema: self.default_schema,
            fail_connection: self.fail_connection,
            latency_ms: self.latency_ms,
            factory_name: self.factory_name,
        }
    }
}

impl Default for MockDatabaseModelFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
