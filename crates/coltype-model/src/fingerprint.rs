//! Content hashes used for cache invalidation.
//!
//! Classification functions carry an author-supplied fingerprint (a short
//! description plus a change date or version tag). Any change to that text
//! yields a different hash and therefore a cache miss downstream.

use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// Hash an ordered list of fingerprint parts.
///
/// Parts are length-prefixed so that `["ab", "c"]` and `["a", "bc"]` differ.
pub fn fingerprint_hash<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        let part = part.as_ref();
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}
