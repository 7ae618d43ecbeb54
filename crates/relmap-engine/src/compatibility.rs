//! Compatibility of foreign keys that share one physical constraint
//!
//! A database holds a single foreign key constraint per name on a table. When
//! several logical foreign keys resolve to the same constraint they must agree
//! on every physical aspect. Five checks run in a fixed order and the first
//! failing one decides the outcome; later checks are not evaluated.
//!
//! 1. principal table (schema and name, case-insensitive)
//! 2. dependent columns (ordered)
//! 3. principal columns (ordered)
//! 4. uniqueness
//! 5. delete behavior

use relmap_core::{
    DeleteBehavior, Diagnostic, DiagnosticCode, ForeignKeyDescriptor, Location, SeverityThreshold,
    Severity, StoreObjectIdentifier,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::naming::{format_columns, ColumnProjection};

/// Which check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    PrincipalTable,
    Column,
    PrincipalColumn,
    Uniqueness,
    DeleteBehavior,
}

impl MismatchKind {
    /// Stable diagnostic code for this kind
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::PrincipalTable => DiagnosticCode::DuplicateForeignKeyPrincipalTableMismatch,
            Self::Column => DiagnosticCode::DuplicateForeignKeyColumnMismatch,
            Self::PrincipalColumn => DiagnosticCode::DuplicateForeignKeyPrincipalColumnMismatch,
            Self::Uniqueness => DiagnosticCode::DuplicateForeignKeyUniquenessMismatch,
            Self::DeleteBehavior => DiagnosticCode::DuplicateForeignKeyDeleteBehaviorMismatch,
        }
    }
}

/// The mismatched values of the failing check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MismatchDetail {
    PrincipalTable { first: String, second: String },
    Columns { first: Vec<String>, second: Vec<String> },
    PrincipalColumns { first: Vec<String>, second: Vec<String> },
    Uniqueness { first: bool, second: bool },
    DeleteBehavior { first: DeleteBehavior, second: DeleteBehavior },
}

impl MismatchDetail {
    pub fn kind(&self) -> MismatchKind {
        match self {
            Self::PrincipalTable { .. } => MismatchKind::PrincipalTable,
            Self::Columns { .. } => MismatchKind::Column,
            Self::PrincipalColumns { .. } => MismatchKind::PrincipalColumn,
            Self::Uniqueness { .. } => MismatchKind::Uniqueness,
            Self::DeleteBehavior { .. } => MismatchKind::DeleteBehavior,
        }
    }

    /// Both values rendered for display
    pub fn rendered_values(&self) -> (String, String) {
        match self {
            Self::PrincipalTable { first, second } => (first.clone(), second.clone()),
            Self::Columns { first, second } | Self::PrincipalColumns { first, second } => {
                (format_columns(first), format_columns(second))
            }
            Self::Uniqueness { first, second } => (first.to_string(), second.to_string()),
            Self::DeleteBehavior { first, second } => (first.to_string(), second.to_string()),
        }
    }
}

/// Two foreign keys mapped to the same constraint disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyMismatch {
    /// Properties of the first foreign key, as `{'A', 'B'}`
    pub first_properties: String,

    /// Display name of the first foreign key's declaring entity
    pub first_entity: String,

    pub second_properties: String,

    pub second_entity: String,

    /// Schema-qualified table of the first foreign key's declaring entity
    pub table: String,

    pub constraint_name: String,

    pub detail: MismatchDetail,
}

impl ForeignKeyMismatch {
    pub fn kind(&self) -> MismatchKind {
        self.detail.kind()
    }

    /// Human-readable explanation
    pub fn message(&self) -> String {
        let prefix = format!(
            "The foreign keys {} on '{}' and {} on '{}' are both mapped to '{}.{}'",
            self.first_properties,
            self.first_entity,
            self.second_properties,
            self.second_entity,
            self.table,
            self.constraint_name
        );
        let (first, second) = self.detail.rendered_values();

        match self.detail {
            MismatchDetail::PrincipalTable { .. } => format!(
                "{}, but are referencing different principal tables ('{}' and '{}').",
                prefix, first, second
            ),
            MismatchDetail::Columns { .. } => {
                format!("{}, but use different columns ({} and {}).", prefix, first, second)
            }
            MismatchDetail::PrincipalColumns { .. } => format!(
                "{}, but are referencing different principal columns ({} and {}).",
                prefix, first, second
            ),
            MismatchDetail::Uniqueness { .. } => format!(
                "{}, but with different uniqueness configurations ({} and {}).",
                prefix, first, second
            ),
            MismatchDetail::DeleteBehavior { .. } => format!(
                "{}, but configured with different delete behavior ('{}' and '{}').",
                prefix, first, second
            ),
        }
    }

    /// Convert to a diagnostic, applying severity overrides
    pub fn to_diagnostic(&self, severity: &SeverityThreshold) -> Diagnostic {
        let code = self.kind().code();
        let (first, second) = self.detail.rendered_values();

        Diagnostic::new(code, severity.get_severity(code, Severity::Error), self.message())
            .with_location(Location::with_constraint(
                self.first_entity.clone(),
                self.table.clone(),
                self.constraint_name.clone(),
            ))
            .with_comparison(first, second)
            .with_related(vec![self.second_entity.clone()])
    }
}

impl fmt::Display for ForeignKeyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ForeignKeyMismatch {}

/// Outcome of comparing two foreign keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Both may be collapsed onto one constraint
    Compatible,

    Incompatible(Box<ForeignKeyMismatch>),
}

impl Compatibility {
    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible)
    }

    pub fn mismatch(&self) -> Option<&ForeignKeyMismatch> {
        match self {
            Self::Compatible => None,
            Self::Incompatible(mismatch) => Some(mismatch),
        }
    }

    pub fn kind(&self) -> Option<MismatchKind> {
        self.mismatch().map(ForeignKeyMismatch::kind)
    }

    /// Treat a mismatch as an error
    pub fn into_result(self) -> Result<(), ForeignKeyMismatch> {
        match self {
            Self::Compatible => Ok(()),
            Self::Incompatible(mismatch) => Err(*mismatch),
        }
    }
}

/// Compare two foreign keys that map to the same constraint in `store_object`
///
/// Callers must only pass foreign keys already known to map to `store_object`.
pub fn are_compatible<P>(
    first: &ForeignKeyDescriptor<'_>,
    second: &ForeignKeyDescriptor<'_>,
    store_object: &StoreObjectIdentifier,
    projection: &P,
) -> Compatibility
where
    P: ColumnProjection + ?Sized,
{
    match first_mismatch(first, second, store_object, projection) {
        None => Compatibility::Compatible,
        Some(detail) => Compatibility::Incompatible(Box::new(ForeignKeyMismatch {
            first_properties: first.format_properties(),
            first_entity: first.declaring_entity().display_name().to_string(),
            second_properties: second.format_properties(),
            second_entity: second.declaring_entity().display_name().to_string(),
            table: first.declaring_table_name(),
            constraint_name: projection.constraint_name(first, store_object),
            detail,
        })),
    }
}

fn first_mismatch<P>(
    first: &ForeignKeyDescriptor<'_>,
    second: &ForeignKeyDescriptor<'_>,
    store_object: &StoreObjectIdentifier,
    projection: &P,
) -> Option<MismatchDetail>
where
    P: ColumnProjection + ?Sized,
{
    if first.principal_table() != second.principal_table() {
        return Some(MismatchDetail::PrincipalTable {
            first: first.principal_table_name(),
            second: second.principal_table_name(),
        });
    }

    let columns = projection.column_names(first.properties(), store_object);
    let other_columns = projection.column_names(second.properties(), store_object);
    if columns != other_columns {
        return Some(MismatchDetail::Columns {
            first: columns,
            second: other_columns,
        });
    }

    let principal_columns = projection.column_names(first.principal_key_properties(), store_object);
    let other_principal_columns = projection.column_names(second.principal_key_properties(), store_object);
    if principal_columns != other_principal_columns {
        return Some(MismatchDetail::PrincipalColumns {
            first: principal_columns,
            second: other_principal_columns,
        });
    }

    if first.is_unique() != second.is_unique() {
        return Some(MismatchDetail::Uniqueness {
            first: first.is_unique(),
            second: second.is_unique(),
        });
    }

    if first.delete_behavior() != second.delete_behavior() {
        return Some(MismatchDetail::DeleteBehavior {
            first: first.delete_behavior(),
            second: second.delete_behavior(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::ConventionProjection;
    use relmap_core::{EntityType, ForeignKey, Model};

    fn pair(first: ForeignKey, second: ForeignKey) -> Model {
        Model::new(vec![
            EntityType::new("Customer")
                .with_table("Customers", Some("dbo"))
                .with_properties(["Id", "Region"])
                .with_primary_key(["Id", "Region"]),
            EntityType::new("Order")
                .with_table("Orders", Some("dbo"))
                .with_properties(["Id", "CustomerId", "CustomerRegion"])
                .with_foreign_key(first),
            EntityType::new("OrderSummary")
                .with_table("Orders", Some("dbo"))
                .with_properties(["Id", "CustomerId", "CustomerRegion"])
                .with_foreign_key(second),
        ])
    }

    fn fk() -> ForeignKey {
        ForeignKey::new(["CustomerId", "CustomerRegion"], "Customer")
    }

    fn check(model: &Model) -> Compatibility {
        let fks = model.resolve_foreign_keys(None).unwrap();
        let store_object = fks[0].declaring_table().clone();
        are_compatible(&fks[0], &fks[1], &store_object, &ConventionProjection::default())
    }

    #[test]
    fn identical_foreign_keys_are_compatible() {
        let result = check(&pair(fk(), fk()));
        assert!(result.is_compatible());
        assert!(result.into_result().is_ok());
    }

    #[test]
    fn uniqueness_difference_is_reported_with_both_values() {
        let result = check(&pair(fk().with_unique(true), fk()));
        assert_eq!(result.kind(), Some(MismatchKind::Uniqueness));

        let mismatch = result.into_result().unwrap_err();
        assert_eq!(mismatch.detail, MismatchDetail::Uniqueness { first: true, second: false });
        assert_eq!(mismatch.first_entity, "Order");
        assert_eq!(mismatch.second_entity, "OrderSummary");
        assert_eq!(mismatch.table, "dbo.Orders");
        assert_eq!(mismatch.constraint_name, "FK_Orders_Customers_CustomerId_CustomerRegion");
    }

    #[test]
    fn message_names_both_foreign_keys() {
        let result = check(&pair(
            fk().with_delete_behavior(DeleteBehavior::Cascade),
            fk().with_delete_behavior(DeleteBehavior::Restrict),
        ));
        let mismatch = result.mismatch().unwrap();

        assert_eq!(
            mismatch.to_string(),
            "The foreign keys {'CustomerId', 'CustomerRegion'} on 'Order' and \
             {'CustomerId', 'CustomerRegion'} on 'OrderSummary' are both mapped to \
             'dbo.Orders.FK_Orders_Customers_CustomerId_CustomerRegion', but configured \
             with different delete behavior ('Cascade' and 'Restrict')."
        );
    }

    #[test]
    fn diagnostic_carries_code_and_values() {
        let result = check(&pair(fk(), fk().with_delete_behavior(DeleteBehavior::NoAction)));
        let diagnostic = result.mismatch().unwrap().to_diagnostic(&SeverityThreshold::default());

        assert_eq!(diagnostic.code, DiagnosticCode::DuplicateForeignKeyDeleteBehaviorMismatch);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.first.as_deref(), Some("ClientSetNull"));
        assert_eq!(diagnostic.second.as_deref(), Some("NoAction"));
        assert_eq!(diagnostic.related, vec!["OrderSummary".to_string()]);
    }

    #[test]
    fn severity_override_applies_to_diagnostic() {
        let mut severity = SeverityThreshold::default();
        severity.set_override(DiagnosticCode::DuplicateForeignKeyUniquenessMismatch, Severity::Warn);

        let result = check(&pair(fk(), fk().with_unique(true)));
        let diagnostic = result.mismatch().unwrap().to_diagnostic(&severity);
        assert_eq!(diagnostic.severity, Severity::Warn);
    }

    #[test]
    fn explicit_constraint_name_is_used_in_mismatch() {
        let result = check(&pair(
            fk().with_constraint_name("FK_Shared"),
            fk().with_constraint_name("FK_Shared").with_unique(true),
        ));
        assert_eq!(result.mismatch().unwrap().constraint_name, "FK_Shared");
    }

    #[test]
    fn mismatch_kind_codes_are_distinct() {
        let kinds = [
            MismatchKind::PrincipalTable,
            MismatchKind::Column,
            MismatchKind::PrincipalColumn,
            MismatchKind::Uniqueness,
            MismatchKind::DeleteBehavior,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(MismatchKind::code).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
