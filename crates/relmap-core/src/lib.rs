//! relmap Core
//!
//! Logical model and physical identity types shared by the engine, the
//! scaffolding crate and the CLI.
//! Never rename diagnostic codes - they are part of the public API.

pub mod annotations;
pub mod config;
pub mod diagnostic;
pub mod model;
pub mod report;
pub mod store_object;

pub use annotations::Annotations;
pub use config::{Config, ConfigError, NamingConfig, NamingConvention, SeverityThreshold};
pub use diagnostic::{Diagnostic, DiagnosticCode, Location, Severity};
pub use model::{
    ColumnOverride, DeleteBehavior, EntityType, ForeignKey, ForeignKeyDescriptor, Model,
    ModelError, Property,
};
pub use report::{Report, ReportSummary, ReportVersion};
pub use store_object::{StoreObjectError, StoreObjectIdentifier, StoreObjectKind};
