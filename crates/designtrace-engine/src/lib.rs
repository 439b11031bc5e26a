//! DesignTrace engine - Core business logic
//!
//! This crate implements the main analysis pipeline:
//! - Cross-source schema comparison
//! - Traceability and dependency checks wired into one run
//! - Report assembly

pub mod runner;
pub mod schema_check;

pub use runner::{AnalysisOutcome, Analyzer, FkEdge, TableFacts};
pub use schema_check::SchemaComparison;
