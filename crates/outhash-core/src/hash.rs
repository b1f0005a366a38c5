//! Content hashing.
//!
//! Digests are computed over the artifact bytes followed by the optional
//! salt, encoded per the configured encoding, and truncated to the configured
//! length. The same bytes and config always produce the same output; the
//! renamer and the output validator rely on that to agree with each other.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::error::{Error, Result};

/// Supported digest algorithms
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Get the name of the algorithm
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Raw digest size in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            HashAlgorithm::Md5 => 16,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    fn digest(&self, bytes: &[u8], salt: Option<&[u8]>) -> Vec<u8> {
        match self {
            HashAlgorithm::Md5 => {
                let mut input = Vec::with_capacity(bytes.len() + salt.map_or(0, <[u8]>::len));
                input.extend_from_slice(bytes);
                if let Some(salt) = salt {
                    input.extend_from_slice(salt);
                }
                md5::compute(&input).0.to_vec()
            }
            HashAlgorithm::Sha256 => salted_digest::<Sha256>(bytes, salt),
            HashAlgorithm::Sha384 => salted_digest::<Sha384>(bytes, salt),
            HashAlgorithm::Sha512 => salted_digest::<Sha512>(bytes, salt),
        }
    }
}

fn salted_digest<D: Digest>(bytes: &[u8], salt: Option<&[u8]>) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(bytes);
    if let Some(salt) = salt {
        hasher.update(salt);
    }
    hasher.finalize().to_vec()
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Text encoding applied to raw digest bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestEncoding {
    Hex,
    Base64,
}

impl DigestEncoding {
    /// Get the name of the encoding
    pub fn name(&self) -> &'static str {
        match self {
            DigestEncoding::Hex => "hex",
            DigestEncoding::Base64 => "base64",
        }
    }

    /// Encoded length for a raw digest of `digest_size` bytes
    pub fn encoded_len(&self, digest_size: usize) -> usize {
        match self {
            DigestEncoding::Hex => digest_size * 2,
            DigestEncoding::Base64 => digest_size.div_ceil(3) * 4,
        }
    }

    fn encode(&self, bytes: &[u8]) -> String {
        match self {
            DigestEncoding::Hex => hex::encode(bytes),
            DigestEncoding::Base64 => BASE64.encode(bytes),
        }
    }

    /// Check whether every character of `fragment` belongs to this encoding's
    /// output alphabet. Used to locate hash fragments embedded in file names.
    pub fn matches_fragment(&self, fragment: &str) -> bool {
        if fragment.is_empty() {
            return false;
        }
        match self {
            DigestEncoding::Hex => fragment.chars().all(|c| c.is_ascii_hexdigit()),
            DigestEncoding::Base64 => fragment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')),
        }
    }
}

impl fmt::Display for DigestEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DigestEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hex" => Ok(DigestEncoding::Hex),
            "base64" => Ok(DigestEncoding::Base64),
            other => Err(Error::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Hashing parameters for one pipeline run.
///
/// Inherited from the host build's output settings rather than configured
/// independently, so the renamed files embed exactly the digests the host
/// advertises.
#[derive(Clone, Debug)]
pub struct HashConfig {
    /// Digest algorithm
    pub algorithm: HashAlgorithm,
    /// Output text encoding
    pub encoding: DigestEncoding,
    /// Truncation length of the embedded fragment, in encoded characters
    pub digest_length: usize,
    /// Optional salt appended to every hashed input
    pub salt: Option<String>,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Md5,
            encoding: DigestEncoding::Hex,
            digest_length: 20,
            salt: None,
        }
    }
}

impl HashConfig {
    /// Create a new hash config
    pub fn new(algorithm: HashAlgorithm, encoding: DigestEncoding, digest_length: usize) -> Self {
        Self {
            algorithm,
            encoding,
            digest_length,
            salt: None,
        }
    }

    /// Set the salt
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }
}

/// A computed digest pair: the full encoded digest and its truncation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashedContent {
    /// Complete encoded digest
    pub full: String,
    /// First `digest_length` characters of `full`
    pub short: String,
}

/// Content hasher for one pipeline run.
///
/// Construction validates the config; hashing itself is a pure function with
/// no failure path.
#[derive(Clone, Debug)]
pub struct Hasher {
    config: HashConfig,
}

impl Hasher {
    /// Create a hasher, rejecting unsupported hashing parameters
    pub fn new(config: HashConfig) -> Result<Self> {
        let max = config.encoding.encoded_len(config.algorithm.digest_size());
        if config.digest_length == 0 || config.digest_length > max {
            return Err(Error::InvalidDigestLength {
                length: config.digest_length,
                max,
            });
        }
        Ok(Self { config })
    }

    /// The config this hasher was built from
    pub fn config(&self) -> &HashConfig {
        &self.config
    }

    /// Digest `bytes` (plus the configured salt) into a full/short pair
    pub fn hash(&self, bytes: &[u8]) -> HashedContent {
        let salt = self.config.salt.as_deref().map(str::as_bytes);
        let raw = self.config.algorithm.digest(bytes, salt);
        let full = self.config.encoding.encode(&raw);
        let short = full[..self.config.digest_length].to_string();
        HashedContent { full, short }
    }
}
