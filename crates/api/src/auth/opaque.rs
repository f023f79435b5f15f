//! Opaque single-use tokens for password reset and email verification.
//!
//! The raw token (64 hex chars) is handed to its owner exactly once; only the
//! SHA-256 digest is persisted, so a database leak exposes nothing redeemable.

use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// Generate a fresh opaque token. Returns `(raw, digest)` where `raw` goes
/// to the owner and `digest` is what the database stores.
pub fn generate_opaque_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let raw = hex_encode(&bytes);
    let digest = hash_opaque_token(&raw);
    (raw, digest)
}

/// Digest a raw token for lookup against the stored column.
pub fn hash_opaque_token(raw: &str) -> String {
    hex_encode(&Sha256::digest(raw.as_bytes()))
}

/// Bearer token identifying an anonymous intro session. Stored as-is: the
/// token is itself random, so digesting it buys nothing.
pub fn generate_temp_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

/// Short random nonce for JWT `jti` claims.
pub fn nonce() -> String {
    let mut bytes = [0u8; 8];
    rand::rng().fill_bytes(&mut bytes);
    hex_encode(&bytes)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_shape() {
        let (raw, digest) = generate_opaque_token();
        assert_eq!(raw.len(), 64);
        assert_eq!(digest.len(), 64);
        assert!(raw.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(raw, digest);
    }

    #[test]
    fn digest_is_deterministic() {
        let (raw, digest) = generate_opaque_token();
        assert_eq!(hash_opaque_token(&raw), digest);
    }

    #[test]
    fn tokens_are_unique() {
        let (a, _) = generate_opaque_token();
        let (b, _) = generate_opaque_token();
        assert_ne!(a, b);
        assert_ne!(generate_temp_token(), generate_temp_token());
    }

    #[test]
    fn known_digest() {
        // sha256("abc")
        assert_eq!(
            hash_opaque_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
