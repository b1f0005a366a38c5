//! Rehash pass configuration.
//!
//! Hashing parameters live in [`crate::hash::HashConfig`] and come from the
//! host build's output settings; this config only covers what the pass itself
//! decides: which artifacts are indexes, and whether to validate emitted
//! output.

use std::collections::BTreeSet;

/// Configuration for one rehash pass
#[derive(Clone, Debug)]
pub struct RehashConfig {
    /// Stable names of the artifacts assumed to reference other artifacts
    pub index_artifacts: BTreeSet<String>,

    /// Run the post-emission validation pass
    pub validate_output: bool,

    /// Glob-style file name pattern selecting which emitted files to validate
    pub validate_pattern: String,
}

impl Default for RehashConfig {
    fn default() -> Self {
        Self {
            index_artifacts: BTreeSet::new(),
            validate_output: false,
            validate_pattern: "*".to_string(),
        }
    }
}

impl RehashConfig {
    /// Create a config with the given index designation
    pub fn new(index_artifacts: impl IntoIterator<Item = String>) -> Self {
        Self {
            index_artifacts: index_artifacts.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Designate one more stable name as an index artifact
    pub fn with_index_artifact(mut self, stable_name: impl Into<String>) -> Self {
        self.index_artifacts.insert(stable_name.into());
        self
    }

    /// Enable output validation
    pub fn with_validation(mut self, pattern: impl Into<String>) -> Self {
        self.validate_output = true;
        self.validate_pattern = pattern.into();
        self
    }
}
