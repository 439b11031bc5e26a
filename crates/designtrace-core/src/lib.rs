//! DesignTrace Core
//!
//! Core domain model with stable, versioned types.
//! Never rename issue codes - they are part of the public API.

pub mod artifact;
pub mod config;
pub mod diagnostic;
pub mod report;
pub mod requirement;

pub use artifact::{Artifact, ArtifactKind, ColumnFact, FactSource, IndexFact, SchemaFact};
pub use config::{Config, ConfigError, SeverityThreshold};
pub use diagnostic::{IssueCategory, IssueCode, Location, Severity, ValidationIssue};
pub use report::{ConsistencyReport, ReportSummary, ReportVersion};
pub use requirement::{RequirementId, RequirementParseError, DEFAULT_CATEGORIES};
