//! Configuration management for outhash.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (OUTHASH_*)
//! 2. Config file (outhash.toml in the working directory)
//! 3. Default values
//!
//! Hash settings are kept as strings here and parsed through the core's
//! `FromStr` impls, so unsupported algorithm or encoding values surface as
//! the core's configuration errors.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use outhash_core::{HashConfig, RehashConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hashing parameters, inherited from the build's output settings
    #[serde(default)]
    pub hash: HashSettings,

    /// Rehash pass settings
    #[serde(default)]
    pub rehash: RehashSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashSettings {
    /// Digest algorithm (md5, sha256, sha384, sha512)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// Digest text encoding (hex, base64)
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Embedded fragment length in encoded characters
    #[serde(default = "default_digest_length")]
    pub digest_length: usize,

    /// Optional salt appended to every hashed input
    pub salt: Option<String>,
}

impl Default for HashSettings {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            encoding: default_encoding(),
            digest_length: default_digest_length(),
            salt: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RehashSettings {
    /// Stable names of index artifacts (file names with the hash segment
    /// removed, e.g. `vendor.js`)
    #[serde(default)]
    pub index_artifacts: Vec<String>,

    /// Validate emitted files after rewriting
    #[serde(default)]
    pub validate_output: bool,

    /// Glob-style pattern selecting which emitted files to validate
    #[serde(default = "default_validate_pattern")]
    pub validate_pattern: String,
}

impl Default for RehashSettings {
    fn default() -> Self {
        Self {
            index_artifacts: Vec::new(),
            validate_output: false,
            validate_pattern: default_validate_pattern(),
        }
    }
}

fn default_algorithm() -> String {
    "md5".to_string()
}

fn default_encoding() -> String {
    "hex".to_string()
}

fn default_digest_length() -> usize {
    20
}

fn default_validate_pattern() -> String {
    "*".to_string()
}

impl Config {
    /// Path of the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from("outhash.toml")
    }

    /// Load configuration with the documented precedence
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(algorithm) = std::env::var("OUTHASH_ALGORITHM") {
            self.hash.algorithm = algorithm;
        }
        if let Ok(encoding) = std::env::var("OUTHASH_ENCODING") {
            self.hash.encoding = encoding;
        }
        if let Ok(length) = std::env::var("OUTHASH_DIGEST_LENGTH") {
            if let Ok(length) = length.parse() {
                self.hash.digest_length = length;
            }
        }
        if let Ok(salt) = std::env::var("OUTHASH_SALT") {
            self.hash.salt = Some(salt);
        }
        if let Ok(names) = std::env::var("OUTHASH_INDEX_ARTIFACTS") {
            self.rehash.index_artifacts = names
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
        }
    }

    /// Typed hashing parameters
    pub fn hash_config(&self) -> Result<HashConfig> {
        let algorithm = self.hash.algorithm.parse()?;
        let encoding = self.hash.encoding.parse()?;
        let mut config = HashConfig::new(algorithm, encoding, self.hash.digest_length);
        if let Some(salt) = &self.hash.salt {
            config = config.with_salt(salt.clone());
        }
        Ok(config)
    }

    /// Typed rehash pass settings
    pub fn rehash_config(&self) -> RehashConfig {
        let mut config = RehashConfig::new(self.rehash.index_artifacts.iter().cloned());
        config.validate_output = self.rehash.validate_output;
        config.validate_pattern = self.rehash.validate_pattern.clone();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outhash_core::{DigestEncoding, HashAlgorithm};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.hash.algorithm, "md5");
        assert_eq!(config.hash.digest_length, 20);
        assert!(!config.rehash.validate_output);
        assert_eq!(config.rehash.validate_pattern, "*");
    }

    #[test]
    fn test_parse_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outhash.toml");
        std::fs::write(
            &path,
            r#"
[hash]
algorithm = "sha256"
digest_length = 8

[rehash]
index_artifacts = ["vendor.js"]
validate_output = true
validate_pattern = "*.js"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.hash.algorithm, "sha256");
        assert_eq!(config.hash.encoding, "hex"); // field default applies
        assert_eq!(config.hash.digest_length, 8);
        assert_eq!(config.rehash.index_artifacts, vec!["vendor.js"]);
        assert!(config.rehash.validate_output);

        let hash_config = config.hash_config().unwrap();
        assert_eq!(hash_config.algorithm, HashAlgorithm::Sha256);
        assert_eq!(hash_config.encoding, DigestEncoding::Hex);

        let rehash_config = config.rehash_config();
        assert!(rehash_config.index_artifacts.contains("vendor.js"));
        assert_eq!(rehash_config.validate_pattern, "*.js");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.hash.algorithm, "md5");
    }

    #[test]
    fn test_unsupported_algorithm_is_rejected() {
        let config = Config {
            hash: HashSettings {
                algorithm: "crc32".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = config.hash_config().unwrap_err();
        assert!(err.to_string().contains("crc32"));
    }
}
