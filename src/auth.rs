// src/auth.rs
use astra::Request;
use sha2::{Digest, Sha256};

pub const SECRET_HEADER: &str = "x-sync-secret";

/// Hash a secret using SHA-256 so comparisons always see equal-length input.
pub fn hash_secret(secret: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    let out = hasher.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}

/// Compares two digests without stopping at the first differing byte.
pub fn hashes_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

pub fn secret_matches(provided: &str, expected: &str) -> bool {
    !expected.is_empty() && hashes_equal(&hash_secret(provided), &hash_secret(expected))
}

/// The shared secret sent with a sync trigger, from `X-Sync-Secret` or a
/// bearer `Authorization` header.
pub fn provided_secret(req: &Request) -> Option<String> {
    let headers = req.headers();
    if let Some(v) = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(v.to_string());
    }
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
}
