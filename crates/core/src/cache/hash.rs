//! Content-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the fingerprint of an outbound request from its canonical wire form.
///
/// The result is a lowercase hex SHA-256 digest (64 chars).
pub fn compute_fingerprint(wire_request: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(wire_request);
    hex::encode(hasher.finalize())
}
