//! Artifact and schema-fact types

use serde::{Deserialize, Serialize};

/// Kind of design artifact under analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Database table definition (YAML, DDL, or Markdown)
    Database,

    /// API specification
    Api,

    /// Screen specification
    Screen,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Api => write!(f, "api"),
            Self::Screen => write!(f, "screen"),
        }
    }
}

/// One design document under analysis
///
/// The engine only reads artifacts; loading them from disk belongs to the
/// caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Path relative to project root
    pub path: String,

    /// Artifact kind
    pub kind: ArtifactKind,

    /// Raw text content
    pub text: String,
}

impl Artifact {
    /// Create a new artifact
    pub fn new(path: impl Into<String>, kind: ArtifactKind, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            text: text.into(),
        }
    }
}

/// Which definition a schema fact was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactSource {
    /// The YAML source of truth
    Yaml,

    /// The generated DDL
    Ddl,

    /// The generated Markdown definition document
    Markdown,
}

impl std::fmt::Display for FactSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Ddl => write!(f, "DDL"),
            Self::Markdown => write!(f, "Markdown"),
        }
    }
}

/// A column as seen by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFact {
    /// Column name
    pub name: String,

    /// Declared type string, as written in the source
    pub type_name: String,

    /// Whether the column is nullable
    pub nullable: bool,

    /// Whether the column is part of the primary key
    pub primary_key: bool,
}

impl ColumnFact {
    /// Create a nullable, non-key column
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            primary_key: false,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark as primary key (implies NOT NULL in every supported dialect)
    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }
}

/// An index as seen by one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexFact {
    /// Index name
    pub name: String,

    /// Indexed column names, in key order
    pub columns: Vec<String>,
}

/// A normalized, source-tagged snapshot of one table's structure
///
/// Facts are transient: produced per validation run by the out-of-scope
/// extraction collaborators, compared, and discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFact {
    /// Table name, the comparison key
    pub table_name: String,

    /// Columns in source order
    pub columns: Vec<ColumnFact>,

    /// Declared indexes
    #[serde(default)]
    pub indexes: Vec<IndexFact>,

    /// Which definition this fact came from
    pub source: FactSource,
}

impl SchemaFact {
    /// Create a fact with no columns
    pub fn new(table_name: impl Into<String>, source: FactSource) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
            source,
        }
    }

    /// Set the columns
    pub fn with_columns(mut self, columns: Vec<ColumnFact>) -> Self {
        self.columns = columns;
        self
    }

    /// Set the indexes
    pub fn with_indexes(mut self, indexes: Vec<IndexFact>) -> Self {
        self.indexes = indexes;
        self
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&ColumnFact> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column names in source order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_operations() {
        let fact = SchemaFact::new("users", FactSource::Yaml).with_columns(vec![
            ColumnFact::new("id", "BIGINT").with_primary_key(true),
            ColumnFact::new("name", "VARCHAR(100)").with_nullable(false),
        ]);

        assert_eq!(fact.column_names(), vec!["id", "name"]);
        assert!(fact.find_column("id").is_some());
        assert!(fact.find_column("nonexistent").is_none());
    }

    #[test]
    fn fact_json_shape() {
        let fact = SchemaFact::new("users", FactSource::Ddl)
            .with_columns(vec![ColumnFact::new("id", "BIGINT")]);

        let json = serde_json::to_string(&fact).unwrap();
        assert!(json.contains("\"source\":\"ddl\""));

        // indexes default to empty on deserialize
        let back: SchemaFact =
            serde_json::from_str(r#"{"table_name":"t","columns":[],"source":"yaml"}"#).unwrap();
        assert!(back.indexes.is_empty());
    }
}
