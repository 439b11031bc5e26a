//! Requirement-ID value type and grammar
//!
//! A requirement ID is a structured citation of the form `CAT.N-FEATURE.M`
//! (e.g. `PRO.1-BASE.1`) linking a design artifact to a business
//! requirement. Parsing is strict; the category allow-list check is a
//! separate, softer concern because the allow-list may lag real usage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::diagnostic::{IssueCode, Severity, ValidationIssue};

/// Grammar for the canonical text form `CAT.N-FEATURE.M`
static ID_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{3})\.(\d+)-([A-Z0-9_]+)\.(\d+)$").unwrap()
});

/// Default category allow-list
///
/// Categories outside this list are tolerated but flagged as warnings;
/// the list is configurable via [`crate::config::Config`].
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "TNT", "PLT", "ACC", "PRO", "SKL", "CAR", "WPM", "TRN", "RPT", "NTF",
];

/// Error parsing a requirement ID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequirementParseError {
    #[error("malformed requirement ID '{0}': expected CAT.N-FEATURE.M")]
    Malformed(String),

    #[error("requirement ID '{0}' has a non-positive series or detail number")]
    NonPositiveNumber(String),
}

/// An immutable, validated requirement ID
///
/// Equality, hashing and ordering follow the canonical string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequirementId {
    /// Three-letter category code (e.g. `PRO`)
    pub category: String,

    /// Series number within the category (positive)
    pub series: u32,

    /// Feature name (uppercase letters, digits, underscore)
    pub feature: String,

    /// Detail number within the feature (positive)
    pub detail: u32,
}

impl RequirementId {
    /// Parse the canonical text form `CAT.N-FEATURE.M`
    pub fn parse(text: &str) -> Result<Self, RequirementParseError> {
        let caps = ID_GRAMMAR
            .captures(text)
            .ok_or_else(|| RequirementParseError::Malformed(text.to_string()))?;

        // Overflowing numbers are malformed, not panics
        let series: u32 = caps[2]
            .parse()
            .map_err(|_| RequirementParseError::Malformed(text.to_string()))?;
        let detail: u32 = caps[4]
            .parse()
            .map_err(|_| RequirementParseError::Malformed(text.to_string()))?;

        if series == 0 || detail == 0 {
            return Err(RequirementParseError::NonPositiveNumber(text.to_string()));
        }

        Ok(Self {
            category: caps[1].to_string(),
            series,
            feature: caps[3].to_string(),
            detail,
        })
    }

    /// Emit a warning if the category is outside the allow-list
    ///
    /// Unknown categories are tolerated (the allow-list may lag real
    /// usage), so this is never an error.
    pub fn validate_category(&self, allowed: &[String]) -> Option<ValidationIssue> {
        if allowed.iter().any(|c| c == &self.category) {
            return None;
        }

        Some(
            ValidationIssue::new(
                IssueCode::RequirementUnknownCategory,
                Severity::Warn,
                format!(
                    "Requirement ID '{}' uses unknown category '{}'",
                    self, self.category
                ),
            )
            .with_requirement_id(self.clone()),
        )
    }
}

impl std::fmt::Display for RequirementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}-{}.{}",
            self.category, self.series, self.feature, self.detail
        )
    }
}

impl FromStr for RequirementId {
    type Err = RequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RequirementId {
    type Error = RequirementParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RequirementId> for String {
    fn from(id: RequirementId) -> Self {
        id.to_string()
    }
}

impl PartialOrd for RequirementId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RequirementId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_well_formed() {
        let id = RequirementId::parse("PRO.1-BASE.1").unwrap();
        assert_eq!(id.category, "PRO");
        assert_eq!(id.series, 1);
        assert_eq!(id.feature, "BASE");
        assert_eq!(id.detail, 1);
    }

    #[test]
    fn parse_roundtrip() {
        for text in ["PRO.1-BASE.1", "ACC.12-USER_AUTH.34", "NTF.3-MAIL2.9"] {
            let id = RequirementId::parse(text).unwrap();
            assert_eq!(id.to_string(), text);
            assert_eq!(RequirementId::parse(&id.to_string()).unwrap(), id);
        }
    }

    #[test]
    fn parse_rejects_malformed() {
        for text in [
            "pro.1-BASE.1",   // lowercase category
            "PROD.1-BASE.1",  // four-letter category
            "PRO.1-base.1",   // lowercase feature
            "PRO.1-BASE",     // missing detail
            "PRO-1-BASE.1",   // wrong separator
            "PRO.1 BASE.1",   // space
            "",
        ] {
            assert!(
                matches!(
                    RequirementId::parse(text),
                    Err(RequirementParseError::Malformed(_))
                ),
                "expected malformed: {text:?}"
            );
        }
    }

    #[test]
    fn parse_rejects_zero_numbers() {
        assert!(matches!(
            RequirementId::parse("PRO.0-BASE.1"),
            Err(RequirementParseError::NonPositiveNumber(_))
        ));
        assert!(matches!(
            RequirementId::parse("PRO.1-BASE.0"),
            Err(RequirementParseError::NonPositiveNumber(_))
        ));
    }

    #[test]
    fn category_allow_list() {
        let allowed: Vec<String> = DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect();

        let known = RequirementId::parse("PRO.1-BASE.1").unwrap();
        assert!(known.validate_category(&allowed).is_none());

        let unknown = RequirementId::parse("XYZ.1-BASE.1").unwrap();
        let issue = unknown.validate_category(&allowed).unwrap();
        assert_eq!(issue.severity, Severity::Warn);
        assert_eq!(issue.code, IssueCode::RequirementUnknownCategory);
        assert_eq!(issue.requirement_id, Some(unknown));
    }

    #[test]
    fn serializes_as_canonical_string() {
        let id = RequirementId::parse("PRO.1-BASE.1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"PRO.1-BASE.1\"");

        let back: RequirementId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
