//! relmap engine - logical to physical reconciliation
//!
//! This crate implements:
//! - Column projection and constraint naming
//! - Compatibility checks for foreign keys sharing a constraint
//! - The shared foreign key validation pass

pub mod compatibility;
pub mod naming;
pub mod validation;

pub use compatibility::{are_compatible, Compatibility, ForeignKeyMismatch, MismatchDetail, MismatchKind};
pub use naming::{default_constraint_name, format_columns, ColumnProjection, ConventionProjection};
pub use validation::{ForeignKeyValidator, SharedConstraint, ValidationOutcome};
