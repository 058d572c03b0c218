//! BLAKE3 digests for package resources

use blake3::Hasher;

/// Hash prefix for BLAKE3 hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Calculate BLAKE3 hash of in-memory content
pub fn hash_bytes(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
}
