//! The artifact repository.
//!
//! A mutable collection of artifacts keyed by current file name. The rehash
//! pass is its sole mutator for the duration of one run (enforced by the
//! `&mut` borrow), and renaming is a destructive key change: the old key is
//! removed and the new key inserted, so no two live artifacts ever share a
//! name and no artifact is left reachable under a stale name.

use std::collections::BTreeMap;

use crate::artifact::Artifact;
use crate::error::{Error, Result};

/// Name-keyed artifact collection with deterministic iteration order
#[derive(Debug, Default)]
pub struct ArtifactRepository {
    artifacts: BTreeMap<String, Artifact>,
}

impl ArtifactRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artifact under its current file name.
    ///
    /// Fails if the name is already taken.
    pub fn insert(&mut self, artifact: Artifact) -> Result<()> {
        if self.artifacts.contains_key(&artifact.file_name) {
            return Err(Error::DuplicateArtifact(artifact.file_name.clone()));
        }
        self.artifacts.insert(artifact.file_name.clone(), artifact);
        Ok(())
    }

    /// Get an artifact by current file name
    pub fn get(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.get(file_name)
    }

    /// Get a mutable artifact by current file name
    pub fn get_mut(&mut self, file_name: &str) -> Option<&mut Artifact> {
        self.artifacts.get_mut(file_name)
    }

    /// Remove an artifact by current file name
    pub fn remove(&mut self, file_name: &str) -> Option<Artifact> {
        self.artifacts.remove(file_name)
    }

    /// Check whether a file name is live
    pub fn contains(&self, file_name: &str) -> bool {
        self.artifacts.contains_key(file_name)
    }

    /// Iterate artifacts in file-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Artifact)> {
        self.artifacts.iter().map(|(name, artifact)| (name.as_str(), artifact))
    }

    /// Current file names, in order
    pub fn file_names(&self) -> Vec<String> {
        self.artifacts.keys().cloned().collect()
    }

    /// Number of artifacts
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the repository is empty
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Move an artifact from `old` to `new`, updating its recorded file name.
    ///
    /// Renaming to the current name is a no-op. Fails without modifying the
    /// repository if `old` is missing or `new` is already taken.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> Result<&mut Artifact> {
        let new = new.into();
        let mut artifact = self
            .artifacts
            .remove(old)
            .ok_or_else(|| Error::ArtifactNotFound(old.to_string()))?;

        if self.artifacts.contains_key(&new) {
            // Put the artifact back before failing
            self.artifacts.insert(old.to_string(), artifact);
            return Err(Error::DuplicateArtifact(new));
        }

        artifact.file_name = new.clone();
        Ok(self.artifacts.entry(new).or_insert(artifact))
    }
}
