//! Post-emission output validation.
//!
//! Re-hashes emitted files with the same run's hashing parameters and checks
//! that each shipped file name contains the short digest of its on-disk
//! bytes. A pure verification pass: it never renames or mutates anything.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hash::Hasher;

/// One file whose shipped name does not embed the digest of its content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationMismatch {
    /// Emitted file name
    pub file_name: String,
    /// Short digest actually computed from the emitted bytes
    pub computed: String,
}

impl fmt::Display for ValidationMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} does not contain the hash of its content ({})",
            self.file_name, self.computed
        )
    }
}

/// Outcome of a validation sweep over an output directory
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    /// Number of files that matched the pattern and were checked
    pub checked: usize,
    /// Every mismatch found, in file-name order
    pub mismatches: Vec<ValidationMismatch>,
}

impl ValidationReport {
    /// Whether every checked file embedded its content hash
    pub fn is_pass(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Check every file in `dir` whose name matches `pattern`.
///
/// Mismatches are collected across the whole set rather than failing on the
/// first one. Read failures are fatal I/O errors, not mismatches.
pub fn validate_output(dir: &Path, pattern: &str, hasher: &Hasher) -> Result<ValidationReport> {
    let mut file_names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            file_names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    file_names.sort();

    let mut report = ValidationReport::default();
    for file_name in file_names {
        if !glob_match(pattern, &file_name) {
            continue;
        }

        let bytes = fs::read(dir.join(&file_name))?;
        let hashed = hasher.hash(&bytes);
        report.checked += 1;

        if file_name.contains(&hashed.short) {
            debug!("Validated {}", file_name);
        } else {
            warn!(
                "Hash mismatch: {} does not contain {}",
                file_name, hashed.short
            );
            report.mismatches.push(ValidationMismatch {
                file_name,
                computed: hashed.short,
            });
        }
    }

    Ok(report)
}

/// Validate and fail if at least one mismatch was found
pub fn ensure_valid_output(dir: &Path, pattern: &str, hasher: &Hasher) -> Result<ValidationReport> {
    let report = validate_output(dir, pattern, hasher)?;
    if report.is_pass() {
        Ok(report)
    } else {
        Err(Error::ValidationFailed {
            mismatches: report.mismatches,
        })
    }
}

/// Simple glob-style pattern matching.
pub fn glob_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if pattern.starts_with('*') && pattern.ends_with('*') {
        let inner = &pattern[1..pattern.len() - 1];
        return value.contains(inner);
    }
    if pattern.starts_with('*') {
        let suffix = &pattern[1..];
        return value.ends_with(suffix);
    }
    if pattern.ends_with('*') {
        let prefix = &pattern[..pattern.len() - 1];
        return value.starts_with(prefix);
    }
    pattern == value
}
