//! Shared foreign key validation pass
//!
//! Groups every foreign key of a model by the table its declaring entity maps
//! to and by the constraint name it produces there. Each group collapses onto
//! one physical constraint, so every later member is checked against the first
//! one with [`are_compatible`].

use relmap_core::{
    Config, Diagnostic, DiagnosticCode, ForeignKeyDescriptor, Location, Model, ModelError, Report,
    Severity, SeverityThreshold, StoreObjectIdentifier,
};
use std::collections::HashMap;

use crate::compatibility::{are_compatible, Compatibility, ForeignKeyMismatch};
use crate::naming::{ColumnProjection, ConventionProjection};

/// A physical constraint that several compatible foreign keys collapse onto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedConstraint {
    pub store_object: StoreObjectIdentifier,
    pub constraint_name: String,
    /// Declaring entity display names, in declaration order
    pub entities: Vec<String>,
}

/// Result of validating a model
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub report: Report,
    pub shared: Vec<SharedConstraint>,
    pub mismatches: Vec<ForeignKeyMismatch>,
}

impl ValidationOutcome {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

struct ConstraintGroup<'a, 'm> {
    store_object: StoreObjectIdentifier,
    constraint_name: String,
    members: Vec<&'a ForeignKeyDescriptor<'m>>,
}

/// Validates that foreign keys sharing a constraint are compatible
#[derive(Debug, Clone)]
pub struct ForeignKeyValidator<P = ConventionProjection> {
    projection: P,
    severity: SeverityThreshold,
    default_schema: Option<String>,
    report_shared: bool,
}

impl ForeignKeyValidator<ConventionProjection> {
    /// Validator using the configured naming convention
    pub fn from_config(config: &Config) -> Self {
        Self::with_projection(config, ConventionProjection::new(config.naming.clone()))
    }
}

impl<P: ColumnProjection> ForeignKeyValidator<P> {
    /// Validator using a custom column projection
    pub fn with_projection(config: &Config, projection: P) -> Self {
        Self {
            projection,
            severity: config.severity.clone(),
            default_schema: config.naming.default_schema.clone(),
            report_shared: config.report_shared_constraints,
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    /// Run the pass over every foreign key in `model`
    pub fn validate(&self, model: &Model) -> Result<ValidationOutcome, ModelError> {
        let foreign_keys = model.resolve_foreign_keys(self.default_schema.as_deref())?;
        let groups = self.group(&foreign_keys);

        let mut report = Report::new();
        let mut shared = Vec::new();
        let mut mismatches = Vec::new();

        for group in groups.iter().filter(|g| g.members.len() > 1) {
            report.summary.shared_constraints += 1;

            let Some((first, rest)) = group.members.split_first() else {
                continue;
            };
            let mut compatible = true;

            for other in rest {
                let result = are_compatible(first, other, &group.store_object, &self.projection);
                tracing::debug!(
                    table = %group.store_object,
                    constraint = %group.constraint_name,
                    first = first.declaring_entity().display_name(),
                    second = other.declaring_entity().display_name(),
                    compatible = result.is_compatible(),
                    "compared foreign keys"
                );

                if let Compatibility::Incompatible(mismatch) = result {
                    compatible = false;
                    report.add_diagnostic(mismatch.to_diagnostic(&self.severity));
                    mismatches.push(*mismatch);
                }
            }

            if compatible {
                let entities: Vec<String> = group
                    .members
                    .iter()
                    .map(|fk| fk.declaring_entity().display_name().to_string())
                    .collect();

                if self.report_shared {
                    report.add_diagnostic(shared_diagnostic(group, &entities, &self.severity));
                }

                shared.push(SharedConstraint {
                    store_object: group.store_object.clone(),
                    constraint_name: group.constraint_name.clone(),
                    entities,
                });
            }
        }

        report.summary.foreign_keys_checked = foreign_keys.len();

        tracing::info!(
            foreign_keys = foreign_keys.len(),
            shared = shared.len(),
            mismatches = mismatches.len(),
            "foreign key validation finished"
        );

        Ok(ValidationOutcome {
            report,
            shared,
            mismatches,
        })
    }

    fn group<'a, 'm>(&self, foreign_keys: &'a [ForeignKeyDescriptor<'m>]) -> Vec<ConstraintGroup<'a, 'm>> {
        // Tables compare case-insensitively but default names keep the spelling,
        // so every foreign key on a table is named under its first spelling.
        let mut spellings: HashMap<StoreObjectIdentifier, StoreObjectIdentifier> = HashMap::new();
        let mut index: HashMap<(StoreObjectIdentifier, String), usize> = HashMap::new();
        let mut groups: Vec<ConstraintGroup<'a, 'm>> = Vec::new();

        for fk in foreign_keys {
            let store_object = spellings
                .entry(fk.declaring_table().clone())
                .or_insert_with(|| fk.declaring_table().clone())
                .clone();
            let constraint_name = self.projection.constraint_name(fk, &store_object);

            match index.get(&(store_object.clone(), constraint_name.clone())) {
                Some(&i) => groups[i].members.push(fk),
                None => {
                    index.insert((store_object.clone(), constraint_name.clone()), groups.len());
                    groups.push(ConstraintGroup {
                        store_object,
                        constraint_name,
                        members: vec![fk],
                    });
                }
            }
        }

        groups
    }
}

fn shared_diagnostic(group: &ConstraintGroup<'_, '_>, entities: &[String], severity: &SeverityThreshold) -> Diagnostic {
    let code = DiagnosticCode::SharedForeignKeyConstraint;
    let message = format!(
        "Constraint '{}' on '{}' is shared by {} foreign keys",
        group.constraint_name,
        group.store_object,
        group.members.len()
    );

    Diagnostic::new(code, severity.get_severity(code, Severity::Info), message)
        .with_location(Location::with_constraint(
            entities[0].clone(),
            group.store_object.display_name(),
            group.constraint_name.clone(),
        ))
        .with_related(entities[1..].to_vec())
}
