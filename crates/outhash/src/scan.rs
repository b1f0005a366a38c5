//! Locating hash fragments embedded in emitted file names.
//!
//! A standalone host has no build graph to consult, so the embedded fragment
//! and the stable identity are reconstructed from the file name itself.

use outhash_core::DigestEncoding;

/// A file name split into its stable identity and embedded hash fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedName {
    /// File name with the hash segment removed (e.g. `vendor.js`)
    pub stable_name: String,
    /// The embedded hash fragment
    pub fragment: String,
}

/// Split `file_name` around its embedded hash fragment.
///
/// The fragment is the last dot-separated segment of exactly `digest_length`
/// characters drawn from the encoding's output alphabet. Returns `None` for
/// names without a recognizable fragment; such files do not follow the hashed
/// naming scheme and are not artifacts of this pass.
pub fn split_hashed_name(
    file_name: &str,
    digest_length: usize,
    encoding: DigestEncoding,
) -> Option<HashedName> {
    let segments: Vec<&str> = file_name.split('.').collect();
    let position = segments
        .iter()
        .rposition(|segment| segment.len() == digest_length && encoding.matches_fragment(segment))?;

    let stable_name = segments
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != position)
        .map(|(_, segment)| *segment)
        .collect::<Vec<_>>()
        .join(".");

    Some(HashedName {
        stable_name,
        fragment: segments[position].to_string(),
    })
}
