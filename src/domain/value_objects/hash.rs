//! Content Hash Value Object
//!
//! SHA-256 fingerprint used to identify rendered plans.

use std::fmt;

use serde::Serialize;

/// Content hash value object
///
/// Wraps a SHA-256 hex digest with the `sha256:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Prefix for SHA-256 hashes
    pub const PREFIX: &'static str = "sha256:";

    /// Compute the hash of a sequence of byte chunks
    ///
    /// Each chunk is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
    /// produce different digests.
    pub fn from_chunks<'a, I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        for chunk in chunks {
            hasher.update((chunk.len() as u64).to_le_bytes());
            hasher.update(chunk);
        }
        Self(format!("{}{:x}", Self::PREFIX, hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex digest without prefix
    pub fn hex(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// First 12 hex characters, for display
    pub fn short(&self) -> &str {
        let hex = self.hex();
        &hex[..hex.len().min(12)]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_has_prefix_and_64_hex_chars() {
        let hash = ContentHash::from_chunks([b"hello".as_slice()]);
        assert!(hash.as_str().starts_with("sha256:"));
        assert_eq!(hash.hex().len(), 64);
        assert_eq!(hash.short().len(), 12);
    }

    #[test]
    fn chunk_boundaries_matter() {
        let a = ContentHash::from_chunks([b"ab".as_slice(), b"c".as_slice()]);
        let b = ContentHash::from_chunks([b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(a, b);
    }

    #[test]
    fn same_input_same_hash() {
        let hash = || ContentHash::from_chunks([b"compose".as_slice()]);
        assert_eq!(hash(), hash());
    }
}
