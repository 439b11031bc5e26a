//! Corpus-wide traceability analysis
//!
//! Works over a built [`ArtifactIndex`]; every finding becomes a
//! [`ValidationIssue`], never an early abort.

use designtrace_core::{Config, IssueCode, Location, Severity, ValidationIssue};

use crate::index::ArtifactIndex;

/// Finds orphaned, malformed and unknown-category requirement IDs
pub struct TraceabilityAnalyzer<'a> {
    config: &'a Config,
}

impl<'a> TraceabilityAnalyzer<'a> {
    /// Create an analyzer over the given configuration
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find requirement IDs referenced by exactly one artifact
    ///
    /// This is a deliberate heuristic, not a correctness guarantee: an ID
    /// legitimately defined in a single requirement document but never
    /// cited elsewhere is also flagged. That false-positive noise is
    /// accepted, which is why the severity defaults to Warn.
    pub fn find_orphans(&self, index: &ArtifactIndex) -> Vec<ValidationIssue> {
        let severity = self
            .config
            .severity
            .get_severity(IssueCode::TraceabilityOrphan, Severity::Warn);

        let mut issues: Vec<ValidationIssue> = index
            .all_ids()
            .filter_map(|id| {
                let paths = index.artifacts_for(id)?;
                if paths.len() != 1 {
                    return None;
                }
                let path = paths.iter().next()?;

                Some(
                    ValidationIssue::new(
                        IssueCode::TraceabilityOrphan,
                        severity,
                        format!(
                            "Requirement ID '{id}' is only referenced by '{path}'; no other artifact traces to it"
                        ),
                    )
                    .with_location(Location::new(path.clone()))
                    .with_requirement_id(id.clone()),
                )
            })
            .collect();

        sort_by_location(&mut issues);
        issues
    }

    /// Find raw citations that failed to parse as requirement IDs
    pub fn find_malformed(&self, index: &ArtifactIndex) -> Vec<ValidationIssue> {
        let severity = self
            .config
            .severity
            .get_severity(IssueCode::RequirementMalformed, Severity::Error);

        // Index malformed entries are already sorted by (path, line)
        index
            .malformed()
            .iter()
            .map(|m| {
                ValidationIssue::new(
                    IssueCode::RequirementMalformed,
                    severity,
                    format!(
                        "Citation '{}' does not match the CAT.N-FEATURE.M requirement-ID grammar",
                        m.raw
                    ),
                )
                .with_location(Location::with_line(m.path.clone(), m.line))
            })
            .collect()
    }

    /// Find well-formed IDs whose category is outside the allow-list
    pub fn find_unknown_categories(&self, index: &ArtifactIndex) -> Vec<ValidationIssue> {
        let mut issues: Vec<ValidationIssue> = index
            .all_ids()
            .filter_map(|id| {
                let mut issue = id.validate_category(&self.config.categories)?;
                // Attach the first citing artifact for context
                if let Some(path) = index.artifacts_for(id).and_then(|p| p.iter().next()) {
                    issue = issue.with_location(Location::new(path.clone()));
                }
                Some(issue)
            })
            .collect();

        sort_by_location(&mut issues);
        issues
    }

    /// Run every traceability check
    pub fn analyze(&self, index: &ArtifactIndex) -> Vec<ValidationIssue> {
        let mut issues = self.find_malformed(index);
        issues.extend(self.find_orphans(index));
        issues.extend(self.find_unknown_categories(index));
        issues
    }
}

/// Stable (artifact_path, line) ordering for diffable reports
fn sort_by_location(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        let key = |i: &ValidationIssue| {
            i.location
                .as_ref()
                .map(|l| (l.file.clone(), l.line.unwrap_or(0)))
                .unwrap_or_default()
        };
        key(a).cmp(&key(b))
    });
}
