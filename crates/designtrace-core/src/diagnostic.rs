//! Validation issue codes and structured diagnostics
//!
//! IMPORTANT: Issue codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

use crate::requirement::RequirementId;

/// Issue code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    // Requirement-ID issues (1xxx)
    /// A requirement-ID citation that does not match the `CAT.N-FEATURE.M` grammar
    RequirementMalformed,

    /// A well-formed ID whose category is outside the configured allow-list
    RequirementUnknownCategory,

    // Traceability issues (2xxx)
    /// A requirement ID referenced by exactly one artifact in the corpus
    TraceabilityOrphan,

    // Schema consistency issues (3xxx)
    /// A table is defined in one source but missing from another (YAML/DDL/Markdown)
    SchemaMissingSource,

    /// Two sources disagree on the number of columns
    SchemaColumnCountMismatch,

    /// A column exists in one source but not in another
    SchemaColumnMissing,

    /// Two sources declare different types for the same column
    SchemaTypeMismatch,

    /// Two sources disagree on a column's nullability
    SchemaNullabilityMismatch,

    /// An index declared in the YAML definition is absent from the DDL
    SchemaIndexMissing,

    // Dependency issues (4xxx)
    /// The foreign-key graph contains a cycle among two or more tables
    DependencyCycle,
}

impl IssueCode {
    /// Get the issue code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequirementMalformed => "REQUIREMENT_MALFORMED",
            Self::RequirementUnknownCategory => "REQUIREMENT_UNKNOWN_CATEGORY",
            Self::TraceabilityOrphan => "TRACEABILITY_ORPHAN",
            Self::SchemaMissingSource => "SCHEMA_MISSING_SOURCE",
            Self::SchemaColumnCountMismatch => "SCHEMA_COLUMN_COUNT_MISMATCH",
            Self::SchemaColumnMissing => "SCHEMA_COLUMN_MISSING",
            Self::SchemaTypeMismatch => "SCHEMA_TYPE_MISMATCH",
            Self::SchemaNullabilityMismatch => "SCHEMA_NULLABILITY_MISMATCH",
            Self::SchemaIndexMissing => "SCHEMA_INDEX_MISSING",
            Self::DependencyCycle => "DEPENDENCY_CYCLE",
        }
    }

    /// The issue category this code belongs to
    pub fn category(&self) -> IssueCategory {
        match self {
            Self::RequirementMalformed | Self::RequirementUnknownCategory => {
                IssueCategory::RequirementId
            }
            Self::TraceabilityOrphan => IssueCategory::Traceability,
            Self::SchemaMissingSource
            | Self::SchemaColumnCountMismatch
            | Self::SchemaColumnMissing
            | Self::SchemaTypeMismatch
            | Self::SchemaNullabilityMismatch
            | Self::SchemaIndexMissing => IssueCategory::SchemaConsistency,
            Self::DependencyCycle => IssueCategory::DependencyCycle,
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue category, used for grouping and report sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    /// Requirement-ID grammar and allow-list issues
    RequirementId,

    /// Cross-artifact traceability issues
    Traceability,

    /// YAML/DDL/Markdown schema disagreement
    SchemaConsistency,

    /// Foreign-key graph cycles
    DependencyCycle,
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequirementId => write!(f, "requirement_id"),
            Self::Traceability => write!(f, "traceability"),
            Self::SchemaConsistency => write!(f, "schema_consistency"),
            Self::DependencyCycle => write!(f, "dependency_cycle"),
        }
    }
}

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - blocking issue that should fail CI
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

/// Source location in an artifact
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Artifact path relative to project root
    pub file: String,

    /// Optional line number (1-indexed)
    pub line: Option<usize>,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }

    /// Create a location with file and line number
    pub fn with_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }
}

/// A validation issue with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable issue code
    pub code: IssueCode,

    /// Severity level
    pub severity: Severity,

    /// Issue category (derived from the code)
    pub category: IssueCategory,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// The requirement ID involved, if any
    pub requirement_id: Option<RequirementId>,

    /// Expected value (for comparison issues)
    pub expected: Option<String>,

    /// Actual value (for comparison issues)
    pub actual: Option<String>,
}

impl ValidationIssue {
    /// Create a new issue with minimal fields
    pub fn new(code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            category: code.category(),
            message: message.into(),
            location: None,
            requirement_id: None,
            expected: None,
            actual: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the requirement ID
    pub fn with_requirement_id(mut self, id: RequirementId) -> Self {
        self.requirement_id = Some(id);
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_code_stability() {
        // Ensure codes are stable strings
        assert_eq!(IssueCode::RequirementMalformed.as_str(), "REQUIREMENT_MALFORMED");
        assert_eq!(IssueCode::SchemaTypeMismatch.as_str(), "SCHEMA_TYPE_MISMATCH");
        assert_eq!(IssueCode::DependencyCycle.as_str(), "DEPENDENCY_CYCLE");
    }

    #[test]
    fn code_category_mapping() {
        assert_eq!(IssueCode::TraceabilityOrphan.category(), IssueCategory::Traceability);
        assert_eq!(
            IssueCode::SchemaColumnMissing.category(),
            IssueCategory::SchemaConsistency
        );
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Error > Severity::Warn);
        assert!(Severity::Warn > Severity::Info);
    }

    #[test]
    fn issue_serialization() {
        let issue = ValidationIssue::new(
            IssueCode::SchemaColumnMissing,
            Severity::Error,
            "Column 'user_id' is missing",
        )
        .with_location(Location::with_line("tables/users.yaml", 42));

        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("SCHEMA_COLUMN_MISSING"));
        assert!(json.contains("error"));
        assert!(json.contains("schema_consistency"));
    }
}
