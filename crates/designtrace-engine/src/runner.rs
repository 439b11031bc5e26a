//! Whole-corpus analysis pipeline
//!
//! The [`Analyzer`] is the explicit context object: it owns the
//! configuration and threads it into every check, so no component relies
//! on process-wide state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use designtrace_core::{
    Artifact, Config, ConsistencyReport, IssueCode, SchemaFact, Severity, ValidationIssue,
};
use designtrace_graph::{CycleError, DependencyGraph};
use designtrace_trace::{ArtifactIndex, TraceabilityAnalyzer};

use crate::schema_check::SchemaComparison;

/// The up-to-three facts known for one table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableFacts {
    /// Fact extracted from the YAML source of truth
    pub yaml: Option<SchemaFact>,

    /// Fact extracted from the generated DDL
    pub ddl: Option<SchemaFact>,

    /// Fact extracted from the generated Markdown document
    pub markdown: Option<SchemaFact>,
}

/// One foreign-key declaration: `table` references `references`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FkEdge {
    /// The table carrying the foreign key
    pub table: String,

    /// The referenced table
    pub references: String,

    /// Whether the declaration is self-referencing
    #[serde(default)]
    pub is_self: bool,
}

/// Everything one analysis run produces
///
/// The cycle error is kept verbatim next to the report so callers can
/// never mistake a failed ordering for a partial one.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    /// All issues from every check, merged and sorted
    pub report: ConsistencyReport,

    /// The resolved table order, or the cycle that prevented one
    pub table_order: Result<Vec<String>, CycleError>,
}

/// Runs a full consistency analysis over already-loaded inputs
pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    /// Create an analyzer with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in effect
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze a corpus
    ///
    /// Per-artifact and per-table failures become issues in the report;
    /// only the dependency-ordering step can fail outright, and that
    /// failure is surfaced both as a report issue and as the untouched
    /// [`CycleError`] in the outcome.
    pub fn analyze(
        &self,
        artifacts: &[Artifact],
        tables: &BTreeMap<String, TableFacts>,
        fk_edges: &[FkEdge],
    ) -> AnalysisOutcome {
        let index = ArtifactIndex::build_parallel(artifacts, self.config.scan_workers);
        debug!(
            artifacts = index.artifacts_scanned(),
            ids = index.id_count(),
            "artifact index built"
        );

        let trace_issues = TraceabilityAnalyzer::new(&self.config).analyze(&index);

        let mut schema_issues = Vec::new();
        for (name, facts) in tables {
            let cmp = SchemaComparison::compare(
                name,
                facts.yaml.as_ref(),
                facts.ddl.as_ref(),
                facts.markdown.as_ref(),
            );
            debug!(table = %name, issues = cmp.issues.len(), "schema facts compared");
            schema_issues.extend(cmp.issues);
        }

        let mut graph = DependencyGraph::new();
        for name in tables.keys() {
            graph.add_node(name.clone());
        }
        for edge in fk_edges {
            if edge.is_self {
                graph.add_edge(edge.table.clone(), edge.table.clone());
            } else {
                graph.add_edge(edge.table.clone(), edge.references.clone());
            }
        }

        let table_order = graph.topological_order();

        let mut cycle_issues = Vec::new();
        if let Err(cycle) = &table_order {
            cycle_issues.push(
                ValidationIssue::new(
                    IssueCode::DependencyCycle,
                    Severity::Error,
                    cycle.to_string(),
                )
                .with_comparison("acyclic foreign-key graph", cycle.members.join(" -> ")),
            );
        }

        let issues = [trace_issues, schema_issues, cycle_issues]
            .into_iter()
            .map(|list| self.apply_overrides(list))
            .collect::<Vec<_>>();

        let mut report = ConsistencyReport::merge(issues);
        report.summary.artifacts_scanned = index.artifacts_scanned();
        report.summary.tables_checked = tables.len();

        AnalysisOutcome {
            report,
            table_order,
        }
    }

    /// Apply configured severity overrides in one place
    fn apply_overrides(&self, issues: Vec<ValidationIssue>) -> Vec<ValidationIssue> {
        issues
            .into_iter()
            .map(|mut issue| {
                issue.severity = self.config.severity.get_severity(issue.code, issue.severity);
                issue
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use designtrace_core::{ArtifactKind, ColumnFact, FactSource};

    fn facts_for(name: &str) -> TableFacts {
        let columns = vec![ColumnFact::new("id", "BIGINT").with_primary_key(true)];
        TableFacts {
            yaml: Some(SchemaFact::new(name, FactSource::Yaml).with_columns(columns.clone())),
            ddl: Some(SchemaFact::new(name, FactSource::Ddl).with_columns(columns.clone())),
            markdown: Some(
                SchemaFact::new(name, FactSource::Markdown).with_columns(columns),
            ),
        }
    }

    #[test]
    fn clean_corpus_is_valid() {
        let artifacts = vec![
            Artifact::new("db.yaml", ArtifactKind::Database, "要求仕様ID: PRO.1-BASE.1\n"),
            Artifact::new("api.md", ArtifactKind::Api, "[PRO.1-BASE.1]\n"),
        ];
        let tables = BTreeMap::from([("users".to_string(), facts_for("users"))]);

        let outcome = Analyzer::new(Config::default()).analyze(&artifacts, &tables, &[]);

        assert!(outcome.report.is_valid());
        assert_eq!(outcome.table_order.unwrap(), vec!["users"]);
        assert_eq!(outcome.report.summary.artifacts_scanned, 2);
        assert_eq!(outcome.report.summary.tables_checked, 1);
    }

    #[test]
    fn cycle_fails_ordering_and_invalidates_report() {
        let tables = BTreeMap::from([
            ("a".to_string(), facts_for("a")),
            ("b".to_string(), facts_for("b")),
        ]);
        let edges = vec![
            FkEdge {
                table: "a".to_string(),
                references: "b".to_string(),
                is_self: false,
            },
            FkEdge {
                table: "b".to_string(),
                references: "a".to_string(),
                is_self: false,
            },
        ];

        let outcome = Analyzer::new(Config::default()).analyze(&[], &tables, &edges);

        let cycle = outcome.table_order.unwrap_err();
        assert_eq!(cycle.members, vec!["a", "b"]);
        assert!(!outcome.report.is_valid());
        assert!(outcome
            .report
            .issues
            .iter()
            .any(|i| i.code == IssueCode::DependencyCycle));
    }

    #[test]
    fn self_referencing_edge_flag_is_honored() {
        let tables = BTreeMap::from([("employees".to_string(), facts_for("employees"))]);
        let edges = vec![FkEdge {
            table: "employees".to_string(),
            references: "employees".to_string(),
            is_self: true,
        }];

        let outcome = Analyzer::new(Config::default()).analyze(&[], &tables, &edges);
        assert_eq!(outcome.table_order.unwrap(), vec!["employees"]);
        assert!(outcome.report.is_valid());
    }

    #[test]
    fn overrides_apply_to_all_issue_streams() {
        let artifacts = vec![Artifact::new(
            "db.yaml",
            ArtifactKind::Database,
            "要求仕様ID: PRO.1-BASE.1\n",
        )];

        let mut config = Config::default();
        config
            .severity
            .set_override(IssueCode::TraceabilityOrphan, Severity::Info);

        let outcome = Analyzer::new(config).analyze(&artifacts, &BTreeMap::new(), &[]);

        let orphan = outcome
            .report
            .issues
            .iter()
            .find(|i| i.code == IssueCode::TraceabilityOrphan)
            .unwrap();
        assert_eq!(orphan.severity, Severity::Info);
    }
}
