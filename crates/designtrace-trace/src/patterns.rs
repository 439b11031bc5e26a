//! Requirement-ID extraction grammar
//!
//! One explicit table of `(pattern, capture group)` entries covers every
//! citation surface, iterated once per artifact. Adding a new citation
//! style means adding one table entry, not a new extractor.

use regex::Regex;
use std::sync::LazyLock;

use designtrace_core::RequirementId;

/// One citation surface
pub struct RefPattern {
    /// Name used in trace logs
    pub name: &'static str,

    /// Pattern with the ID in capture group 1
    pub regex: Regex,
}

/// The extraction grammar table
///
/// Covers the three citation surfaces found in the corpus:
/// - the `要求仕様ID: X` header field of YAML and Markdown artifacts,
/// - `@requirement X` annotations in specs and code blocks,
/// - `[X]` bracket citations in prose. Brackets only qualify when their
///   content loosely resembles an ID (`XXX.N-...`), so ordinary Markdown
///   links are never reported as malformed IDs.
pub static REF_PATTERNS: LazyLock<Vec<RefPattern>> = LazyLock::new(|| {
    vec![
        RefPattern {
            name: "field",
            regex: Regex::new(r"要求仕様ID[:：]\s*([A-Za-z0-9_.\-]+)").unwrap(),
        },
        RefPattern {
            name: "annotation",
            regex: Regex::new(r"@requirement\s+([A-Za-z0-9_.\-]+)").unwrap(),
        },
        RefPattern {
            name: "bracket",
            regex: Regex::new(r"\[([A-Za-z]{2,5}\.\d+-[A-Za-z0-9_.\-]+)\]").unwrap(),
        },
    ]
});

/// One extracted citation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRef {
    /// The raw matched text
    pub raw: String,

    /// 1-indexed line number of the match
    pub line: usize,

    /// The parsed ID, or None when the raw match is malformed
    pub id: Option<RequirementId>,
}

/// Scan text for requirement-ID citations
///
/// Every surface match is returned with its originating line; raw matches
/// that fail to parse are retained (with `id: None`) rather than silently
/// dropped, so malformed citations surface as issues downstream.
pub fn extract_refs(text: &str) -> Vec<ExtractedRef> {
    let mut refs = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        for pattern in REF_PATTERNS.iter() {
            for caps in pattern.regex.captures_iter(line) {
                let raw = caps[1].to_string();
                let id = RequirementId::parse(&raw).ok();
                refs.push(ExtractedRef {
                    raw,
                    line: line_idx + 1,
                    id,
                });
            }
        }
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_field_citation() {
        let refs = extract_refs("table: users\n要求仕様ID: PRO.1-BASE.1\n");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].line, 2);
        assert_eq!(refs[0].raw, "PRO.1-BASE.1");
        assert!(refs[0].id.is_some());
    }

    #[test]
    fn extracts_fullwidth_colon() {
        let refs = extract_refs("要求仕様ID： ACC.2-AUTH.3");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "ACC.2-AUTH.3");
    }

    #[test]
    fn extracts_annotation() {
        let refs = extract_refs("-- @requirement TNT.1-MGMT.2\nCREATE TABLE tenants;");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].line, 1);
        assert_eq!(refs[0].id.as_ref().unwrap().category, "TNT");
    }

    #[test]
    fn extracts_bracket_citation() {
        let refs = extract_refs("See [PRO.1-BASE.1] for details.");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "PRO.1-BASE.1");
    }

    #[test]
    fn ignores_ordinary_brackets() {
        let refs = extract_refs("A [link](https://example.com) and [note] here.");
        assert!(refs.is_empty());
    }

    #[test]
    fn retains_malformed_matches() {
        let refs = extract_refs("要求仕様ID: pro.1-base.1");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw, "pro.1-base.1");
        assert!(refs[0].id.is_none());
    }

    #[test]
    fn multiple_citations_per_line() {
        let refs = extract_refs("[PRO.1-BASE.1] depends on [ACC.1-AUTH.1]");
        assert_eq!(refs.len(), 2);
    }
}
