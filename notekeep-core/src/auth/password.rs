//! Password hashing and verification with Argon2id
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! the salt and cost parameters travel with the digest and verification needs
//! no external state.

use crate::{NotekeepError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext password with a fresh random salt
pub fn hash_password(plaintext: &str) -> Result<String> {
    if plaintext.is_empty() {
        return Err(NotekeepError::validation("password", "must not be empty"));
    }

    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| NotekeepError::Internal(format!("password hashing failed: {}", e)))?;

    Ok(digest.to_string())
}

/// Check a plaintext against a stored digest.
///
/// Malformed digests and empty plaintexts verify as false; the comparison
/// itself is constant time inside `argon2`.
pub fn verify_password(plaintext: &str, digest: &str) -> bool {
    if plaintext.is_empty() {
        return false;
    }

    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("pw1").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("pw1", &digest));
        assert!(!verify_password("pw2", &digest));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same", &first));
        assert!(verify_password("same", &second));
    }

    #[test]
    fn test_empty_plaintext() {
        assert!(hash_password("").is_err());

        let digest = hash_password("pw").unwrap();
        assert!(!verify_password("", &digest));
    }

    #[test]
    fn test_malformed_digest_is_false() {
        assert!(!verify_password("pw", ""));
        assert!(!verify_password("pw", "not-a-phc-string"));
        assert!(!verify_password("pw", "$argon2id$v=19$m=19456,t=2,p=1$broken"));
    }
}
