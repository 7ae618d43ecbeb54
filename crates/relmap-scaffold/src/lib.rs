//! Reverse-engineering support for relmap
//!
//! A [`DatabaseModelFactory`] reads an existing database into a
//! [`DatabaseModel`] of tables and columns. Providers implement the factory
//! trait; [`MockDatabaseModelFactory`] serves predefined tables for tests.
//!
//! ## Example
//!
//! ```rust,ignore
//! use relmap_scaffold::{DatabaseModelFactory, DatabaseModelFactoryOptions};
//!
//! let options = DatabaseModelFactoryOptions::new().with_schema("sales");
//! let model = factory.create(&options).await?;
//! for table in model.tables() {
//!     println!("{}: {:?}", table, table.column_names());
//! }
//! ```

pub mod database_model;
pub mod factory;
pub mod mock;

pub use database_model::{DatabaseColumn, DatabaseModel, DatabaseTable, TableRef, ValueGenerated};
pub use factory::{DatabaseModelFactory, DatabaseModelFactoryOptions, ScaffoldError};
pub use mock::{MockDatabaseModelFactory, MockDatabaseModelFactoryBuilder};
