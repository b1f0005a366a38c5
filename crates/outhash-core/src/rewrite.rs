//! Reference rewriting inside index artifacts.
//!
//! An index artifact references other artifacts by their old, stale file
//! names. Before the index artifact is itself rehashed, every old hash
//! fragment recorded in the rename map is substituted with its replacement in
//! the artifact's textual content.

use tracing::debug;

use crate::artifact::{Artifact, ArtifactContent};
use crate::error::{Error, Result};
use crate::renamer::RenameMap;

/// Apply the rename map to an index artifact's content.
///
/// `Text` content is rewritten in place. `Deferred` content is forced once,
/// rewritten, and replaced by the rewritten literal, so later reads see the
/// rewritten text without recomputation. `Binary` content cannot be rewritten
/// and fails with `UnsupportedArtifact`. An empty rename map is a no-op for
/// any representation.
pub fn rewrite_references(artifact: &mut Artifact, rename_map: &RenameMap) -> Result<()> {
    if rename_map.is_empty() {
        return Ok(());
    }

    match &mut artifact.content {
        ArtifactContent::Text(text) => {
            *text = apply_map(text, rename_map);
        }
        ArtifactContent::Deferred(produce) => {
            let materialized = produce();
            artifact.content = ArtifactContent::Text(apply_map(&materialized, rename_map));
        }
        ArtifactContent::Binary(_) => {
            return Err(Error::UnsupportedArtifact(artifact.file_name.clone()));
        }
    }

    debug!(
        "Rewrote references in {} ({} map entries)",
        artifact.file_name,
        rename_map.len()
    );
    Ok(())
}

/// Replace all occurrences of every old fragment with its new fragment
fn apply_map(text: &str, rename_map: &RenameMap) -> String {
    let mut rewritten = text.to_string();
    for record in rename_map.iter() {
        rewritten = rewritten.replace(&record.old_fragment, &record.new_fragment);
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renamer::RenameRecord;

    fn map(entries: &[(&str, &str)]) -> RenameMap {
        let mut map = RenameMap::new();
        for (old, new) in entries {
            map.push(RenameRecord {
                old_fragment: old.to_string(),
                new_fragment: new.to_string(),
            });
        }
        map
    }

    #[test]
    fn test_rewrites_all_occurrences() {
        let mut artifact = Artifact::text(
            "manifest.00.js",
            "manifest.js",
            "00",
            "a.1111.js a.1111.js.map b.2222.js",
        );
        let map = map(&[("1111", "aaaa"), ("2222", "bbbb")]);

        rewrite_references(&mut artifact, &map).unwrap();
        assert_eq!(
            artifact.content.as_text(),
            Some("a.aaaa.js a.aaaa.js.map b.bbbb.js")
        );
    }

    #[test]
    fn test_zero_occurrences_is_noop() {
        let mut artifact = Artifact::text("manifest.00.js", "manifest.js", "00", "no refs here");
        let map = map(&[("1111", "aaaa")]);

        rewrite_references(&mut artifact, &map).unwrap();
        assert_eq!(artifact.content.as_text(), Some("no refs here"));
    }

    #[test]
    fn test_deferred_is_forced_once_and_cached() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut artifact = Artifact::deferred("manifest.00.js", "manifest.js", "00", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "load(a.1111.js)".to_string()
        });

        let map = map(&[("1111", "aaaa")]);
        rewrite_references(&mut artifact, &map).unwrap();

        // Replaced by the rewritten literal: further reads do not re-produce
        assert_eq!(artifact.content.as_text(), Some("load(a.aaaa.js)"));
        assert_eq!(artifact.content_bytes().as_ref(), b"load(a.aaaa.js)");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_binary_content_is_rejected() {
        let mut artifact = Artifact::binary("manifest.00.bin", "manifest.bin", "00", vec![1u8, 2]);
        let map = map(&[("1111", "aaaa")]);

        let err = rewrite_references(&mut artifact, &map).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArtifact(_)));
    }

    #[test]
    fn test_empty_map_skips_representation_check() {
        // Matches the original behavior: with nothing to rewrite, even an
        // unsupported representation passes through untouched.
        let mut artifact = Artifact::binary("manifest.00.bin", "manifest.bin", "00", vec![1u8, 2]);
        rewrite_references(&mut artifact, &RenameMap::new()).unwrap();
    }
}
