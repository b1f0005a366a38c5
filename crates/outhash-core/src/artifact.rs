//! Artifact model.
//!
//! An artifact is a single named build output. Its file name embeds a hash
//! fragment that may be stale relative to the final content; the renamer
//! replaces that fragment with the digest of the bytes actually shipped.

use std::borrow::Cow;
use std::fmt;

/// Producer for content that the build pipeline materializes on demand
pub type ContentProducer = Box<dyn Fn() -> String + Send + Sync>;

/// The legal content representations of an artifact.
///
/// `Deferred` content is forced at most once by the reference rewriter and
/// replaced with the rewritten `Text` literal, so later reads return the
/// rewritten content without recomputation. `Binary` content can be hashed
/// but never rewritten.
pub enum ArtifactContent {
    /// Fully materialized text content
    Text(String),
    /// Raw bytes
    Binary(Vec<u8>),
    /// Text produced on demand by the build pipeline
    Deferred(ContentProducer),
}

impl ArtifactContent {
    /// The content as bytes, forcing production for deferred content.
    ///
    /// Forcing here does not cache; only the rewriter replaces a deferred
    /// source with its materialized value.
    pub fn to_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            ArtifactContent::Text(text) => Cow::Borrowed(text.as_bytes()),
            ArtifactContent::Binary(bytes) => Cow::Borrowed(bytes),
            ArtifactContent::Deferred(produce) => Cow::Owned(produce().into_bytes()),
        }
    }

    /// Borrow the materialized text, if this content is `Text`
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArtifactContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Debug for ArtifactContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactContent::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            ArtifactContent::Binary(bytes) => f.debug_tuple("Binary").field(&bytes.len()).finish(),
            ArtifactContent::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// A named build output with byte content and an embedded hash fragment
#[derive(Debug)]
pub struct Artifact {
    /// Current file name, containing `hash_fragment` as a substring
    pub file_name: String,
    /// Logical identity, independent of the embedded hash
    pub stable_name: String,
    /// The short digest currently embedded in `file_name`
    pub hash_fragment: String,
    /// Full digest of the content as of the last rehash, if any
    pub full_digest: Option<String>,
    /// Content representation
    pub content: ArtifactContent,
}

impl Artifact {
    /// Create an artifact with materialized text content
    pub fn text(
        file_name: impl Into<String>,
        stable_name: impl Into<String>,
        hash_fragment: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::with_content(file_name, stable_name, hash_fragment, ArtifactContent::Text(content.into()))
    }

    /// Create an artifact with raw byte content
    pub fn binary(
        file_name: impl Into<String>,
        stable_name: impl Into<String>,
        hash_fragment: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self::with_content(file_name, stable_name, hash_fragment, ArtifactContent::Binary(content.into()))
    }

    /// Create an artifact whose content is produced on demand
    pub fn deferred(
        file_name: impl Into<String>,
        stable_name: impl Into<String>,
        hash_fragment: impl Into<String>,
        produce: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        Self::with_content(
            file_name,
            stable_name,
            hash_fragment,
            ArtifactContent::Deferred(Box::new(produce)),
        )
    }

    /// Create an artifact from an explicit content representation
    pub fn with_content(
        file_name: impl Into<String>,
        stable_name: impl Into<String>,
        hash_fragment: impl Into<String>,
        content: ArtifactContent,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            stable_name: stable_name.into(),
            hash_fragment: hash_fragment.into(),
            full_digest: None,
            content,
        }
    }

    /// The content as bytes, forcing production for deferred content
    pub fn content_bytes(&self) -> Cow<'_, [u8]> {
        self.content.to_bytes()
    }
}
