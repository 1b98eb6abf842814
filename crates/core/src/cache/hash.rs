//! Body digests for cached responses.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a response body, stored next to it and checked on read.
pub fn body_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
