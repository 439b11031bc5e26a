//! Configuration schema (designtrace.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::diagnostic::{IssueCode, Severity};
use crate::requirement::DEFAULT_CATEGORIES;

/// Severity threshold overrides for specific issue codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of issue code to severity override
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for an issue code, or the default
    pub fn get_severity(&self, code: IssueCode, default: Severity) -> Severity {
        self.overrides.get(code.as_str()).copied().unwrap_or(default)
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, code: IssueCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

fn default_scan_workers() -> usize {
    4
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Requirement-ID category allow-list
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Severity overrides
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Worker-pool size for the corpus scan (1 disables parallelism)
    #[serde(default = "default_scan_workers")]
    pub scan_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            severity: SeverityThreshold::default(),
            scan_workers: default_scan_workers(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, toml).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}
