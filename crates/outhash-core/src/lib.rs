//! outhash-core - Core library for outhash
//!
//! This crate implements the rehash-and-propagate pass that runs after a
//! build pipeline has finished transforming its output artifacts:
//!
//! - **hash**: deterministic content digests with configurable algorithm,
//!   encoding, truncation length, and optional salt
//! - **artifact**: the artifact model and its content representations
//! - **repository**: the mutable, name-keyed artifact collection
//! - **renamer**: two-phase rehash/rename of ordinary then index artifacts
//! - **rewrite**: old-hash to new-hash reference substitution inside index
//!   artifact content
//! - **validate**: post-emission check that shipped filenames embed the hash
//!   of their on-disk content
//! - **pipeline**: the synchronous staged pipeline a host build registers
//!   this pass into

pub mod artifact;
pub mod config;
pub mod error;
pub mod hash;
pub mod pipeline;
pub mod renamer;
pub mod repository;
pub mod rewrite;
pub mod validate;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactContent};
pub use config::RehashConfig;
pub use error::{Error, Result};
pub use hash::{DigestEncoding, HashAlgorithm, HashConfig, HashedContent, Hasher};
pub use pipeline::{OutputRehash, Phase, Pipeline, PipelineContext, Stage};
pub use renamer::{rehash_artifacts, RenameMap, RenameRecord};
pub use repository::ArtifactRepository;
pub use rewrite::rewrite_references;
pub use validate::{validate_output, ValidationMismatch, ValidationReport};
