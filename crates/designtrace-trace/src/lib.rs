//! DesignTrace traceability
//!
//! Requirement-ID extraction, the artifact/ID index, and the corpus-wide
//! traceability checks.

pub mod analyzer;
pub mod index;
pub mod patterns;

pub use analyzer::TraceabilityAnalyzer;
pub use index::{ArtifactIndex, MalformedRef};
pub use patterns::{extract_refs, ExtractedRef, RefPattern, REF_PATTERNS};
