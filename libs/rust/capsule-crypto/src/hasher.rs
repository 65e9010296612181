//! SHA-256 content digests.

use sha2::{Digest, Sha256};

/// Length of a rendered digest in hex characters.
pub const HASH_HEX_LEN: usize = 64;

/// Key-independent content hashing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// SHA-256 of `data` as 64 lowercase hex characters.
    #[must_use]
    pub fn hash(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// SHA-256 of the UTF-8 bytes of `text`.
    #[must_use]
    pub fn hash_str(text: &str) -> String {
        Self::hash(text.as_bytes())
    }
}
