//! Bidirectional artifact/requirement-ID index
//!
//! Built once per analysis run from already-loaded artifact texts,
//! immutable after construction. A re-scan rebuilds the index wholesale;
//! there is no incremental update path.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use designtrace_core::{Artifact, RequirementId};

use crate::patterns::{extract_refs, ExtractedRef};

/// A raw citation that failed to parse as a requirement ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRef {
    /// Artifact path the citation was found in
    pub path: String,

    /// The raw matched text
    pub raw: String,

    /// 1-indexed line number
    pub line: usize,
}

/// Bidirectional mapping between requirement IDs and artifact paths
#[derive(Debug, Clone, Default)]
pub struct ArtifactIndex {
    /// ID -> set of artifact paths citing it
    by_id: BTreeMap<RequirementId, BTreeSet<String>>,

    /// Artifact path -> set of IDs it cites
    by_path: BTreeMap<String, BTreeSet<RequirementId>>,

    /// Raw matches that failed to parse, sorted by (path, line)
    malformed: Vec<MalformedRef>,

    /// Number of artifacts scanned (including ones with no citations)
    artifacts_scanned: usize,
}

impl ArtifactIndex {
    /// Build the index with a single pass over the artifacts
    ///
    /// Deterministic: the same artifact list always produces an identical
    /// index. Citations are de-duplicated per artifact; an empty artifact
    /// contributes zero entries and never aborts the build.
    pub fn build(artifacts: &[Artifact]) -> Self {
        let extractions: Vec<(&Artifact, Vec<ExtractedRef>)> = artifacts
            .iter()
            .map(|a| (a, extract_refs(&a.text)))
            .collect();

        Self::reduce(artifacts.len(), extractions)
    }

    /// Build the index with a fixed-size worker pool
    ///
    /// Workers each extract citations from a disjoint slice of the corpus;
    /// the shared maps are only populated by a single-threaded reduction
    /// after all workers have joined. Output is identical to [`build`].
    ///
    /// [`build`]: ArtifactIndex::build
    pub fn build_parallel(artifacts: &[Artifact], workers: usize) -> Self {
        if workers <= 1 || artifacts.len() <= 1 {
            return Self::build(artifacts);
        }

        let workers = workers.min(artifacts.len());
        let mut partials: Vec<Vec<(usize, Vec<ExtractedRef>)>> = Vec::with_capacity(workers);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    scope.spawn(move || {
                        artifacts
                            .iter()
                            .enumerate()
                            .skip(w)
                            .step_by(workers)
                            .map(|(i, a)| (i, extract_refs(&a.text)))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            for handle in handles {
                // A worker can only panic on a pattern bug; propagate it
                partials.push(handle.join().expect("extraction worker panicked"));
            }
        });

        // Restore input order so the reduction matches the serial build
        let mut indexed: Vec<(usize, Vec<ExtractedRef>)> =
            partials.into_iter().flatten().collect();
        indexed.sort_by_key(|(i, _)| *i);

        let extractions = indexed
            .into_iter()
            .map(|(i, refs)| (&artifacts[i], refs))
            .collect();

        Self::reduce(artifacts.len(), extractions)
    }

    /// Single-threaded reduction of per-artifact extraction results
    fn reduce(artifact_count: usize, extractions: Vec<(&Artifact, Vec<ExtractedRef>)>) -> Self {
        let mut index = Self {
            artifacts_scanned: artifact_count,
            ..Self::default()
        };

        for (artifact, refs) in extractions {
            debug!(path = %artifact.path, refs = refs.len(), "indexed artifact");

            let mut seen_malformed: BTreeSet<(String, usize)> = BTreeSet::new();

            for r in refs {
                match r.id {
                    Some(id) => {
                        index
                            .by_id
                            .entry(id.clone())
                            .or_default()
                            .insert(artifact.path.clone());
                        index
                            .by_path
                            .entry(artifact.path.clone())
                            .or_default()
                            .insert(id);
                    }
                    None => {
                        if seen_malformed.insert((r.raw.clone(), r.line)) {
                            index.malformed.push(MalformedRef {
                                path: artifact.path.clone(),
                                raw: r.raw,
                                line: r.line,
                            });
                        }
                    }
                }
            }
        }

        index
            .malformed
            .sort_by(|a, b| (&a.path, a.line).cmp(&(&b.path, b.line)));
        index
    }

    /// All requirement IDs in the corpus, in canonical order
    pub fn all_ids(&self) -> impl Iterator<Item = &RequirementId> {
        self.by_id.keys()
    }

    /// Artifact paths citing the given ID
    pub fn artifacts_for(&self, id: &RequirementId) -> Option<&BTreeSet<String>> {
        self.by_id.get(id)
    }

    /// Requirement IDs cited by the given artifact
    pub fn ids_for(&self, path: &str) -> Option<&BTreeSet<RequirementId>> {
        self.by_path.get(path)
    }

    /// Raw matches that failed to parse, sorted by (path, line)
    pub fn malformed(&self) -> &[MalformedRef] {
        &self.malformed
    }

    /// Number of artifacts scanned
    pub fn artifacts_scanned(&self) -> usize {
        self.artifacts_scanned
    }

    /// Number of distinct requirement IDs in the corpus
    pub fn id_count(&self) -> usize {
        self.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use designtrace_core::ArtifactKind;

    fn corpus() -> Vec<Artifact> {
        vec![
            Artifact::new(
                "tables/users.yaml",
                ArtifactKind::Database,
                "table: users\n要求仕様ID: PRO.1-BASE.1\n",
            ),
            Artifact::new(
                "api/users.md",
                ArtifactKind::Api,
                "# Users API\nImplements [PRO.1-BASE.1] and [ACC.1-AUTH.1].\n",
            ),
            Artifact::new("screens/empty.md", ArtifactKind::Screen, ""),
        ]
    }

    #[test]
    fn builds_both_directions() {
        let index = ArtifactIndex::build(&corpus());

        let id = RequirementId::parse("PRO.1-BASE.1").unwrap();
        let paths = index.artifacts_for(&id).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains("tables/users.yaml"));
        assert!(paths.contains("api/users.md"));

        let ids = index.ids_for("api/users.md").unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn empty_artifact_contributes_nothing() {
        let index = ArtifactIndex::build(&corpus());
        assert!(index.ids_for("screens/empty.md").is_none());
        assert_eq!(index.artifacts_scanned(), 3);
    }

    #[test]
    fn duplicate_citations_deduplicated_per_artifact() {
        let artifacts = vec![Artifact::new(
            "a.md",
            ArtifactKind::Api,
            "[PRO.1-BASE.1] again [PRO.1-BASE.1]\n",
        )];
        let index = ArtifactIndex::build(&artifacts);

        let id = RequirementId::parse("PRO.1-BASE.1").unwrap();
        assert_eq!(index.artifacts_for(&id).unwrap().len(), 1);
        assert_eq!(index.ids_for("a.md").unwrap().len(), 1);
    }

    #[test]
    fn malformed_refs_retained_and_sorted() {
        let artifacts = vec![
            Artifact::new("z.yaml", ArtifactKind::Database, "要求仕様ID: zzz.9-BAD.1\n"),
            Artifact::new(
                "a.yaml",
                ArtifactKind::Database,
                "notes\n要求仕様ID: pro.1-base.1\n",
            ),
        ];
        let index = ArtifactIndex::build(&artifacts);

        assert_eq!(index.malformed().len(), 2);
        assert_eq!(index.malformed()[0].path, "a.yaml");
        assert_eq!(index.malformed()[0].line, 2);
        assert_eq!(index.malformed()[1].path, "z.yaml");
    }

    #[test]
    fn parallel_build_matches_serial() {
        let mut artifacts = corpus();
        for i in 0..20 {
            artifacts.push(Artifact::new(
                format!("gen/{i}.md"),
                ArtifactKind::Screen,
                format!("[RPT.{}-VIEW.1]\n", i + 1),
            ));
        }

        let serial = ArtifactIndex::build(&artifacts);
        let parallel = ArtifactIndex::build_parallel(&artifacts, 4);

        assert_eq!(
            serial.all_ids().collect::<Vec<_>>(),
            parallel.all_ids().collect::<Vec<_>>()
        );
        assert_eq!(serial.malformed(), parallel.malformed());
        assert_eq!(serial.artifacts_scanned(), parallel.artifacts_scanned());
    }
}
