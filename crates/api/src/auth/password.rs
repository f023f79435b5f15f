//! Password hashing with Argon2id.
//!
//! Parameters are pinned (64 MiB, 3 iterations, 1 lane) rather than left to
//! library defaults so hashes stay comparable across upgrades. Hashing is CPU
//! bound; handlers run these functions inside `spawn_blocking`.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use dreamshepherd_core::error::CoreError;
use dreamshepherd_core::registration::MIN_PASSWORD_LEN;

const MEMORY_KIB: u32 = 64 * 1024;
const ITERATIONS: u32 = 3;
const LANES: u32 = 1;

fn hasher() -> Argon2<'static> {
    // Literal parameters, always valid.
    let params = Params::new(MEMORY_KIB, ITERATIONS, LANES, None)
        .expect("argon2 parameters are valid");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hash a raw password, rejecting inputs below the minimum length.
/// Length is counted in characters, matching form validation, so multibyte
/// passwords are not quietly held to a lower bar.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CoreError::Internal(format!("Password hashing failed: {err}")))
}

/// Verify a candidate against a stored hash. Fails closed: an unparsable
/// hash verifies as false rather than erroring.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    hasher()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong horse battery", &hash));
    }

    #[test]
    fn short_password_rejected() {
        assert_matches!(hash_password("seven77"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn short_multibyte_password_rejected() {
        // Four characters, twelve UTF-8 bytes: still too short.
        assert_matches!(hash_password("夢夢夢夢"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("correct horse battery").unwrap();
        let second = hash_password("correct horse battery").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn unparsable_hash_fails_closed() {
        assert!(!verify_password("anything at all", "not-a-phc-string"));
    }
}
