//! Cryptographically secure random generation.
//!
//! Backs the per-token `jti` replay identifiers. All functions use the
//! thread-local generator, which is cryptographically secure by default.

use rand::Rng;

/// Generates a cryptographically secure random byte array.
///
/// # Arguments
///
/// * `len` - Number of random bytes to generate
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Generates a URL-safe base64-encoded random string.
///
/// Suitable for token identifiers carried inside JSON claims and URLs.
///
/// # Arguments
///
/// * `byte_len` - Number of random bytes (output will be ~4/3 this length)
#[must_use]
pub fn random_base64url(byte_len: usize) -> String {
    let bytes = random_bytes(byte_len);
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_bytes_produces_correct_length() {
        assert_eq!(random_bytes(16).len(), 16);
        assert_eq!(random_bytes(32).len(), 32);
    }

    #[test]
    fn random_bytes_produces_different_values() {
        let a = random_bytes(32);
        let b = random_bytes(32);
        assert_ne!(a, b);
    }

    #[test]
    fn random_base64url_no_special_chars() {
        let s = random_base64url(32);
        // URL-safe base64 only contains alphanumeric, dash, and underscore
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn random_base64url_uniqueness() {
        let ids: HashSet<String> = (0..1000).map(|_| random_base64url(16)).collect();
        assert_eq!(ids.len(), 1000);
    }
}
