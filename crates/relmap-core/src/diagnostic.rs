//! Diagnostics produced by model checks
//!
//! Codes appear in report.json and in `[severity.overrides]`, so their string
//! form never changes once released. New conditions get new codes.

use serde::{Deserialize, Serialize};

/// Stable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    /// Foreign keys sharing a constraint reference different principal tables
    DuplicateForeignKeyPrincipalTableMismatch,

    /// Foreign keys sharing a constraint use different dependent columns
    DuplicateForeignKeyColumnMismatch,

    /// Foreign keys sharing a constraint reference different principal columns
    DuplicateForeignKeyPrincipalColumnMismatch,

    /// Foreign keys sharing a constraint differ in uniqueness
    DuplicateForeignKeyUniquenessMismatch,

    /// Foreign keys sharing a constraint differ in delete behavior
    DuplicateForeignKeyDeleteBehaviorMismatch,

    /// Several foreign keys were collapsed onto one physical constraint
    SharedForeignKeyConstraint,
}

impl DiagnosticCode {
    /// String form used in reports and config
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateForeignKeyPrincipalTableMismatch => {
                "DUPLICATE_FOREIGN_KEY_PRINCIPAL_TABLE_MISMATCH"
            }
            Self::DuplicateForeignKeyColumnMismatch => "DUPLICATE_FOREIGN_KEY_COLUMN_MISMATCH",
            Self::DuplicateForeignKeyPrincipalColumnMismatch => {
                "DUPLICATE_FOREIGN_KEY_PRINCIPAL_COLUMN_MISMATCH"
            }
            Self::DuplicateForeignKeyUniquenessMismatch => {
                "DUPLICATE_FOREIGN_KEY_UNIQUENESS_MISMATCH"
            }
            Self::DuplicateForeignKeyDeleteBehaviorMismatch => {
                "DUPLICATE_FOREIGN_KEY_DELETE_BEHAVIOR_MISMATCH"
            }
            Self::SharedForeignKeyConstraint => "SHARED_FOREIGN_KEY_CONSTRAINT",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    /// Reported but does not fail `relmap check`
    Warn,
    /// The model cannot be mapped as declared
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where in the model a diagnostic applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Declaring entity type
    pub entity: String,

    /// Schema-qualified table the entity maps to
    pub table: Option<String>,

    /// Physical constraint name
    pub constraint: Option<String>,
}

impl Location {
    /// Location of a constraint on the entity's table
    pub fn with_constraint(
        entity: impl Into<String>,
        table: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            table: Some(table.into()),
            constraint: Some(constraint.into()),
        }
    }
}

/// One finding, with the compared values when it comes from a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Value on the first side of a comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,

    /// Value on the second side of a comparison
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,

    /// Other entity types involved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            first: None,
            second: None,
            related: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_comparison(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.first = Some(first.into());
        self.second = Some(second.into());
        self
    }

    pub fn with_related(mut self, related: Vec<String>) -> Self {
        self.related = related;
        self
    }
}
