use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a byte image (save files, replay end states).
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}
