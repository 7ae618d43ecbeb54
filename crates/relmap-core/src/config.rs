//! Configuration schema (relmap.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::diagnostic::{DiagnosticCode, Severity};

/// How property names become column names when no explicit name is set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// Use the property name unchanged
    #[default]
    AsIs,

    /// `CustomerId` -> `customer_id`
    SnakeCase,

    /// `CustomerId` -> `customerid`
    LowerCase,

    /// `CustomerId` -> `CUSTOMERID`
    UpperCase,
}

impl NamingConvention {
    /// Apply the convention to a property name
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::AsIs => name.to_string(),
            Self::SnakeCase => to_snake_case(name),
            Self::LowerCase => name.to_lowercase(),
            Self::UpperCase => name.to_uppercase(),
        }
    }
}

fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                // End of an acronym: "HTTPServer" -> "http_server"
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Physical naming configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Column naming convention
    #[serde(default)]
    pub convention: NamingConvention,

    /// Longest identifier the target database accepts
    #[serde(default = "default_max_identifier_length")]
    pub max_identifier_length: usize,

    /// Schema used by entities that do not declare one
    #[serde(default)]
    pub default_schema: Option<String>,
}

fn default_max_identifier_length() -> usize {
    128
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            convention: NamingConvention::default(),
            max_identifier_length: default_max_identifier_length(),
            default_schema: None,
        }
    }
}

/// Severity overrides keyed by stable diagnostic code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Overridden severity for `code`, or `default`
    pub fn get_severity(&self, code: DiagnosticCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    pub fn set_override(&mut self, code: DiagnosticCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

/// Contents of `relmap.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Emit an info diagnostic for every constraint shared by compatible foreign keys
    #[serde(default = "default_report_shared")]
    pub report_shared_constraints: bool,

    #[serde(default)]
    pub naming: NamingConfig,

    /// Per-code severity overrides
    #[serde(default)]
    pub severity: SeverityThreshold,
}

fn default_report_shared() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_shared_constraints: default_report_shared(),
            naming: NamingConfig::default(),
            severity: SeverityThreshold::default(),
        }
    }
}

impl Config {
    /// Load `relmap.toml`; missing keys take their defaults
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
