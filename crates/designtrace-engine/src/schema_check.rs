//! Cross-source schema consistency comparison
//!
//! Compares up to three [`SchemaFact`]s for the same table, one per
//! definition source (YAML source of truth, generated DDL, generated
//! Markdown document), and emits an issue for every disagreement.
//!
//! Columns are compared as sets, not positionally: the extraction
//! collaborators cannot guarantee source order for Markdown tables, so a
//! positional comparison would flag formatting differences as drift.

use designtrace_core::{
    ColumnFact, FactSource, IssueCode, SchemaFact, Severity, ValidationIssue,
};
use std::collections::BTreeSet;

/// Result of comparing one table's facts across sources
#[derive(Debug, Clone)]
pub struct SchemaComparison {
    /// The table being checked
    pub table_name: String,

    /// Issues produced by the comparison
    pub issues: Vec<ValidationIssue>,
}

impl SchemaComparison {
    /// Compare the YAML, DDL and Markdown facts for one table
    ///
    /// Inputs are never mutated. Severities are the defaults; the caller
    /// applies any configured overrides.
    pub fn compare(
        table_name: impl Into<String>,
        yaml: Option<&SchemaFact>,
        ddl: Option<&SchemaFact>,
        markdown: Option<&SchemaFact>,
    ) -> Self {
        let table_name = table_name.into();
        let mut issues = Vec::new();

        let slots = [
            (FactSource::Yaml, yaml),
            (FactSource::Ddl, ddl),
            (FactSource::Markdown, markdown),
        ];
        let present: Vec<(FactSource, &SchemaFact)> = slots
            .iter()
            .filter_map(|(s, f)| f.map(|f| (*s, f)))
            .collect();

        // Nothing defines this table; nothing to compare against
        if present.is_empty() {
            return Self { table_name, issues };
        }

        for (source, fact) in &slots {
            if fact.is_none() {
                issues.push(ValidationIssue::new(
                    IssueCode::SchemaMissingSource,
                    Severity::Error,
                    format!("Table '{table_name}' has no {source} definition"),
                ));
            }
        }

        // Pairwise comparison of every pair of present sources
        for (i, &(a_source, a)) in present.iter().enumerate() {
            for &(b_source, b) in present.iter().skip(i + 1) {
                compare_pair(&table_name, a_source, a, b_source, b, &mut issues);
            }
        }

        // Indexes declared in the YAML source of truth must survive into
        // the generated DDL
        if let (Some(yaml), Some(ddl)) = (yaml, ddl) {
            let ddl_indexes: BTreeSet<&str> =
                ddl.indexes.iter().map(|i| i.name.as_str()).collect();
            for index in &yaml.indexes {
                if !ddl_indexes.contains(index.name.as_str()) {
                    issues.push(ValidationIssue::new(
                        IssueCode::SchemaIndexMissing,
                        Severity::Warn,
                        format!(
                            "Index '{}' on table '{table_name}' is declared in YAML but absent from the DDL",
                            index.name
                        ),
                    ));
                }
            }
        }

        Self { table_name, issues }
    }

    /// Check if the comparison found any errors
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Count error issues
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }
}

fn compare_pair(
    table_name: &str,
    a_source: FactSource,
    a: &SchemaFact,
    b_source: FactSource,
    b: &SchemaFact,
    issues: &mut Vec<ValidationIssue>,
) {
    if a.columns.len() != b.columns.len() {
        issues.push(
            ValidationIssue::new(
                IssueCode::SchemaColumnCountMismatch,
                Severity::Error,
                format!(
                    "Table '{table_name}' has {} columns in {a_source} but {} in {b_source}",
                    a.columns.len(),
                    b.columns.len()
                ),
            )
            .with_comparison(a.columns.len().to_string(), b.columns.len().to_string()),
        );
    }

    for a_col in &a.columns {
        match b.find_column(&a_col.name) {
            Some(b_col) => compare_columns(table_name, a_source, a_col, b_source, b_col, issues),
            None => {
                issues.push(ValidationIssue::new(
                    IssueCode::SchemaColumnMissing,
                    Severity::Error,
                    format!(
                        "Column '{}' of table '{table_name}' exists in {a_source} but not in {b_source}",
                        a_col.name
                    ),
                ));
            }
        }
    }

    for b_col in &b.columns {
        if a.find_column(&b_col.name).is_none() {
            issues.push(ValidationIssue::new(
                IssueCode::SchemaColumnMissing,
                Severity::Error,
                format!(
                    "Column '{}' of table '{table_name}' exists in {b_source} but not in {a_source}",
                    b_col.name
                ),
            ));
        }
    }
}

fn compare_columns(
    table_name: &str,
    a_source: FactSource,
    a_col: &ColumnFact,
    b_source: FactSource,
    b_col: &ColumnFact,
    issues: &mut Vec<ValidationIssue>,
) {
    if normalize_type(&a_col.type_name) != normalize_type(&b_col.type_name) {
        issues.push(
            ValidationIssue::new(
                IssueCode::SchemaTypeMismatch,
                Severity::Warn,
                format!(
                    "Column '{}' of table '{table_name}' is {} in {a_source} but {} in {b_source}",
                    a_col.name, a_col.type_name, b_col.type_name
                ),
            )
            .with_comparison(a_col.type_name.clone(), b_col.type_name.clone()),
        );
    }

    if a_col.nullable != b_col.nullable {
        issues.push(
            ValidationIssue::new(
                IssueCode::SchemaNullabilityMismatch,
                Severity::Warn,
                format!(
                    "Column '{}' of table '{table_name}' is {} in {a_source} but {} in {b_source}",
                    a_col.name,
                    nullability(a_col.nullable),
                    nullability(b_col.nullable)
                ),
            )
            .with_comparison(nullability(a_col.nullable), nullability(b_col.nullable)),
        );
    }
}

fn nullability(nullable: bool) -> &'static str {
    if nullable {
        "NULL"
    } else {
        "NOT NULL"
    }
}

/// Normalize a declared type for comparison
///
/// Case-insensitive, with length/precision qualifiers stripped:
/// `VARCHAR(100)` and `varchar(255)` compare equal.
fn normalize_type(type_name: &str) -> String {
    let base = type_name.split('(').next().unwrap_or(type_name);
    base.trim().to_ascii_lowercase()
}
