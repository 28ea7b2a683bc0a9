//! Object store key layout.
//!
//! Objects live at `aaaa/bbbb/cccc/dddd/eeee`, the first 20 hex characters
//! of the digest split into five 4-character segments. Changing this layout
//! orphans every object already uploaded.

use crate::digest::{DIGEST_HEX_LEN, Digest};
use crate::error::{BinError, BinResult};
use std::fmt;

/// Width of one key segment in hex characters.
pub const SEGMENT_LEN: usize = 4;

/// Number of segments in a key.
pub const SEGMENT_COUNT: usize = 5;

const SEPARATOR: char = '/';

/// Hierarchical object key derived from a [`Digest`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&Digest> for StorageKey {
    fn from(digest: &Digest) -> Self {
        // hex text of a Digest is always well-formed
        Self(segment(&digest.to_hex()))
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the storage key for a hex digest.
///
/// The input must already be normalized; no case folding happens here.
pub fn derive_key(hex_digest: &str) -> BinResult<StorageKey> {
    if hex_digest.len() != DIGEST_HEX_LEN {
        return Err(BinError::format(
            "digest",
            format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                hex_digest.len()
            ),
        ));
    }
    if let Some(c) = hex_digest.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(BinError::format(
            "digest",
            format!("invalid hex character {c:?}"),
        ));
    }
    Ok(StorageKey(segment(hex_digest)))
}

fn segment(hex: &str) -> String {
    let mut key = String::with_capacity(SEGMENT_COUNT * (SEGMENT_LEN + 1));
    for i in 0..SEGMENT_COUNT {
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.push_str(&hex[i * SEGMENT_LEN..(i + 1) * SEGMENT_LEN]);
    }
    key
}
