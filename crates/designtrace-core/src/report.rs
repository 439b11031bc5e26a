//! Consistency report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::diagnostic::{Severity, ValidationIssue};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of issues
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,

    /// Number of artifacts scanned
    pub artifacts_scanned: usize,

    /// Number of tables checked for schema consistency
    pub tables_checked: usize,
}

/// Consistency report (report.json v1)
///
/// This is the stable output format. All fields are public so the
/// serialization collaborator can render JSON or Markdown without
/// reaching into internals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All issues, sorted by (severity desc, category, location, message)
    pub issues: Vec<ValidationIssue>,
}

impl ConsistencyReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            issues: Vec::new(),
        }
    }

    /// Merge issue lists into one report
    ///
    /// Concatenates, sorts for diff-stable output, and tallies the
    /// summary counters.
    pub fn merge<I>(issue_lists: I) -> Self
    where
        I: IntoIterator<Item = Vec<ValidationIssue>>,
    {
        let mut issues: Vec<ValidationIssue> = issue_lists.into_iter().flatten().collect();

        issues.sort_by(|a, b| {
            (Reverse(a.severity), a.category, &a.location, &a.message).cmp(&(
                Reverse(b.severity),
                b.category,
                &b.location,
                &b.message,
            ))
        });

        let summary = ReportSummary {
            total: issues.len(),
            errors: issues.iter().filter(|i| i.severity == Severity::Error).count(),
            warnings: issues.iter().filter(|i| i.severity == Severity::Warn).count(),
            info: issues.iter().filter(|i| i.severity == Severity::Info).count(),
            artifacts_scanned: 0,
            tables_checked: 0,
        };

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            issues,
        }
    }

    /// Add a single issue, keeping the counters in sync
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warn => self.summary.warnings += 1,
            Severity::Info => self.summary.info += 1,
        }

        self.summary.total += 1;
        self.issues.push(issue);
    }

    /// True iff the report carries no Error-severity issues
    ///
    /// Warnings and info never block validity.
    pub fn is_valid(&self) -> bool {
        self.summary.errors == 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for ConsistencyReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{IssueCode, Location, Severity, ValidationIssue};

    #[test]
    fn empty_report() {
        let report = ConsistencyReport::new();
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(report.is_valid());
    }

    #[test]
    fn merge_counts_and_validity() {
        let report = ConsistencyReport::merge([
            vec![ValidationIssue::new(
                IssueCode::SchemaColumnMissing,
                Severity::Error,
                "Missing column",
            )],
            vec![ValidationIssue::new(
                IssueCode::TraceabilityOrphan,
                Severity::Warn,
                "Orphaned ID",
            )],
        ]);

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.warnings, 1);
        assert!(!report.is_valid());
    }

    #[test]
    fn warnings_do_not_block_validity() {
        let report = ConsistencyReport::merge([vec![ValidationIssue::new(
            IssueCode::TraceabilityOrphan,
            Severity::Warn,
            "Orphaned ID",
        )]]);

        assert!(report.is_valid());
    }

    #[test]
    fn merge_sorts_errors_first() {
        let report = ConsistencyReport::merge([vec![
            ValidationIssue::new(IssueCode::TraceabilityOrphan, Severity::Warn, "b")
                .with_location(Location::with_line("a.md", 1)),
            ValidationIssue::new(IssueCode::SchemaColumnMissing, Severity::Error, "a")
                .with_location(Location::with_line("z.md", 9)),
        ]]);

        assert_eq!(report.issues[0].severity, Severity::Error);
        assert_eq!(report.issues[1].severity, Severity::Warn);
    }

    #[test]
    fn merge_is_deterministic() {
        let issues = || {
            vec![
                ValidationIssue::new(IssueCode::SchemaTypeMismatch, Severity::Warn, "t1")
                    .with_location(Location::with_line("b.yaml", 3)),
                ValidationIssue::new(IssueCode::SchemaTypeMismatch, Severity::Warn, "t0")
                    .with_location(Location::with_line("a.yaml", 7)),
            ]
        };

        let a = ConsistencyReport::merge([issues()]);
        let b = ConsistencyReport::merge([issues()]);
        assert_eq!(a.issues, b.issues);
        assert_eq!(a.issues[0].message, "t0");
    }

    #[test]
    fn report_serialization() {
        let report = ConsistencyReport::new();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"issues\""));
    }
}
