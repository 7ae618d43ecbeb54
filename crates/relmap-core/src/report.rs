//! Check report (report.json)
//!
//! The JSON layout is versioned; removing or renaming a field bumps `major`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    pub major: u32,
    pub minor: u32,
}

impl ReportVersion {
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Counts over one check run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,

    /// Foreign keys resolved from the model
    pub foreign_keys_checked: usize,

    /// Constraints that more than one foreign key maps to
    pub shared_constraints: usize,

    /// Diagnostic count per stable code
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub by_code: BTreeMap<String, usize>,
}

/// Outcome of one `relmap check` run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub version: ReportVersion,

    /// RFC 3339 creation time
    pub timestamp: String,

    /// Model file the report was produced from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub summary: ReportSummary,

    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            model: None,
            summary: ReportSummary::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut report = Self::new();
        for diagnostic in diagnostics {
            report.add_diagnostic(diagnostic);
        }
        report
    }

    /// Record the model file this report describes
    pub fn with_model_path(mut self, path: &Path) -> Self {
        self.model = Some(path.display().to_string());
        self
    }

    /// Append a diagnostic and update the counts
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warn => self.summary.warnings += 1,
            Severity::Info => self.summary.info += 1,
        }
        *self
            .summary
            .by_code
            .entry(diagnostic.code.as_str().to_string())
            .or_insert(0) += 1;

        self.summary.total += 1;
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Highest severity present, `None` for an empty report
    pub fn max_severity(&self) -> Option<Severity> {
        self.diagnostics.iter().map(|d| d.severity).max()
    }

    pub fn diagnostics_with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}
