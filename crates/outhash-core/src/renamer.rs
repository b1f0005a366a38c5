//! Two-phase rehash and rename.
//!
//! Phase 1 rehashes every ordinary artifact and accumulates the old-to-new
//! fragment map. Phase 2 rewrites references inside index artifacts with the
//! completed map, then rehashes them on their updated content so their own
//! shipped hash matches their final bytes. The phase boundary is the
//! correctness mechanism: index artifacts must never be rehashed against an
//! incomplete map.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::Hasher;
use crate::repository::ArtifactRepository;
use crate::rewrite::rewrite_references;

/// One old-to-new hash fragment correspondence
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameRecord {
    /// Fragment previously embedded in the artifact's file name
    pub old_fragment: String,
    /// Fragment now embedded after rehashing
    pub new_fragment: String,
}

/// The rename map accumulated while processing ordinary artifacts.
///
/// Scoped to a single run; entries are kept in processing order so reference
/// rewriting is deterministic.
#[derive(Clone, Debug, Default)]
pub struct RenameMap {
    records: Vec<RenameRecord>,
}

impl RenameMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rename
    pub fn push(&mut self, record: RenameRecord) {
        self.records.push(record);
    }

    /// Iterate records in processing order
    pub fn iter(&self) -> impl Iterator<Item = &RenameRecord> {
        self.records.iter()
    }

    /// Number of recorded renames
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether any rename has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up the new fragment recorded for `old_fragment`
    pub fn new_fragment(&self, old_fragment: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.old_fragment == old_fragment)
            .map(|r| r.new_fragment.as_str())
    }
}

/// Rehash every artifact in the repository, ordinary artifacts first.
///
/// Index artifacts are designated by stable name. Returns the rename map of
/// ordinary-artifact fragments; index artifacts' own renames are not part of
/// the map since nothing references them. The first failure aborts the run:
/// a partially built map must not be applied to index content.
pub fn rehash_artifacts(
    repository: &mut ArtifactRepository,
    index_artifacts: &BTreeSet<String>,
    hasher: &Hasher,
) -> Result<RenameMap> {
    let mut ordinary = Vec::new();
    let mut index = Vec::new();
    for (file_name, artifact) in repository.iter() {
        if index_artifacts.contains(&artifact.stable_name) {
            index.push(file_name.to_string());
        } else {
            ordinary.push(file_name.to_string());
        }
    }

    let mut rename_map = RenameMap::new();
    for file_name in ordinary {
        let record = rehash_one(repository, &file_name, hasher)?;
        rename_map.push(record);
    }

    // The map is complete; index artifacts can now be rewritten and rehashed
    // on their final content.
    for file_name in index {
        let artifact = repository
            .get_mut(&file_name)
            .ok_or_else(|| Error::ArtifactNotFound(file_name.clone()))?;
        rewrite_references(artifact, &rename_map)?;
        rehash_one(repository, &file_name, hasher)?;
    }

    Ok(rename_map)
}

/// Rehash a single artifact: compute its content digest, substitute the old
/// fragment in its file name with the new short digest, and rename it in the
/// repository, updating its recorded digest fields.
fn rehash_one(
    repository: &mut ArtifactRepository,
    file_name: &str,
    hasher: &Hasher,
) -> Result<RenameRecord> {
    let artifact = repository
        .get(file_name)
        .ok_or_else(|| Error::ArtifactNotFound(file_name.to_string()))?;

    let old_fragment = artifact.hash_fragment.clone();
    if old_fragment.is_empty() || !file_name.contains(&old_fragment) {
        return Err(Error::fragment_not_in_name(file_name, old_fragment));
    }

    let hashed = hasher.hash(&artifact.content_bytes());
    let new_name = file_name.replace(&old_fragment, &hashed.short);
    debug!("Rehashed {} -> {}", file_name, new_name);

    let renamed = repository.rename(file_name, new_name)?;
    renamed.hash_fragment = hashed.short.clone();
    renamed.full_digest = Some(hashed.full);

    Ok(RenameRecord {
        old_fragment,
        new_fragment: hashed.short,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;
    use crate::hash::{DigestEncoding, HashAlgorithm, HashConfig};

    fn hasher() -> Hasher {
        Hasher::new(HashConfig::new(
            HashAlgorithm::Sha256,
            DigestEncoding::Hex,
            8,
        ))
        .unwrap()
    }

    #[test]
    fn test_ordinary_rename_only_changes_fragment() {
        let mut repo = ArtifactRepository::new();
        repo.insert(Artifact::text("app.00000000.js", "app.js", "00000000", "X"))
            .unwrap();

        let hasher = hasher();
        let map = rehash_artifacts(&mut repo, &BTreeSet::new(), &hasher).unwrap();

        let short = hasher.hash(b"X").short;
        let new_name = format!("app.{short}.js");
        assert!(repo.contains(&new_name));
        assert_eq!(map.len(), 1);
        assert_eq!(map.new_fragment("00000000"), Some(short.as_str()));

        let artifact = repo.get(&new_name).unwrap();
        assert_eq!(artifact.hash_fragment, short);
        assert_eq!(artifact.full_digest.as_deref(), Some(hasher.hash(b"X").full.as_str()));
    }

    #[test]
    fn test_index_renames_not_recorded_in_map() {
        let mut repo = ArtifactRepository::new();
        repo.insert(Artifact::text("app.00000000.js", "app.js", "00000000", "X"))
            .unwrap();
        repo.insert(Artifact::text(
            "manifest.11111111.js",
            "manifest.js",
            "11111111",
            "load(\"app.00000000.js\")",
        ))
        .unwrap();

        let index: BTreeSet<String> = ["manifest.js".to_string()].into();
        let map = rehash_artifacts(&mut repo, &index, &hasher()).unwrap();

        assert_eq!(map.len(), 1);
        assert!(map.new_fragment("11111111").is_none());
    }

    #[test]
    fn test_missing_fragment_fails_loudly() {
        let mut repo = ArtifactRepository::new();
        // Recorded fragment does not appear in the file name
        repo.insert(Artifact::text("app.js", "app.js", "00000000", "X"))
            .unwrap();

        let err = rehash_artifacts(&mut repo, &BTreeSet::new(), &hasher()).unwrap_err();
        assert!(matches!(err, Error::FragmentNotInName { .. }));
    }

    #[test]
    fn test_unchanged_content_keeps_name_stable_across_runs() {
        let mut repo = ArtifactRepository::new();
        repo.insert(Artifact::text("app.00000000.js", "app.js", "00000000", "X"))
            .unwrap();

        let hasher = hasher();
        rehash_artifacts(&mut repo, &BTreeSet::new(), &hasher).unwrap();
        let first = repo.file_names();

        // A second pass over already-correct names is a fixed point
        rehash_artifacts(&mut repo, &BTreeSet::new(), &hasher).unwrap();
        assert_eq!(repo.file_names(), first);
    }
}
