//! Error types for outhash-core.

use thiserror::Error;

use crate::validate::ValidationMismatch;

/// Result type alias using outhash-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for rehash operations
#[derive(Error, Debug)]
pub enum Error {
    // Hash configuration errors
    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Unsupported digest encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Invalid digest length {length}: must be between 1 and {max}")]
    InvalidDigestLength { length: usize, max: usize },

    // Repository errors
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Artifact name already in use: {0}")]
    DuplicateArtifact(String),

    // Rename errors
    #[error("Hash fragment {fragment:?} not present in artifact name {file_name:?}")]
    FragmentNotInName { file_name: String, fragment: String },

    // Rewrite errors
    #[error("Cannot rewrite references in {0}: unsupported content representation")]
    UnsupportedArtifact(String),

    // Validation errors
    #[error("No output directory recorded for validation")]
    MissingOutputDir,

    #[error("Output validation failed: {}", mismatch_list(.mismatches))]
    ValidationFailed { mismatches: Vec<ValidationMismatch> },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a fragment-not-in-name error
    pub fn fragment_not_in_name(file_name: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::FragmentNotInName {
            file_name: file_name.into(),
            fragment: fragment.into(),
        }
    }

    /// Check if this error is a validation failure
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}

fn mismatch_list(mismatches: &[ValidationMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failed_display() {
        let err = Error::ValidationFailed {
            mismatches: vec![ValidationMismatch {
                file_name: "app.deadbeef.js".into(),
                computed: "0badf00d".into(),
            }],
        };

        assert!(err.is_validation_failure());
        let display = err.to_string();
        assert!(display.contains("app.deadbeef.js"));
        assert!(display.contains("0badf00d"));
    }

    #[test]
    fn test_fragment_not_in_name_display() {
        let err = Error::fragment_not_in_name("app.js", "deadbeef");
        assert!(err.to_string().contains("app.js"));
        assert!(err.to_string().contains("deadbeef"));
    }
}
