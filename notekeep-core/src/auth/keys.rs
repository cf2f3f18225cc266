//! Token signing key management
//!
//! The process-wide HS256 key is derived from an operator-supplied secret with
//! HKDF-SHA256, or generated at random when no secret is configured.

use crate::{NotekeepError, Result};
use hkdf::Hkdf;
use jwt_simple::prelude::HS256Key;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;

/// Shortest secret accepted for key derivation, in bytes
pub const MIN_SECRET_LEN: usize = 16;

const KEY_LEN: usize = 32;
const DERIVATION_SALT: &[u8] = b"notekeep/token-signing/v1";
const DERIVATION_INFO: &[u8] = b"hs256";

/// HMAC-SHA256 key used to sign and verify access tokens
#[derive(Clone)]
pub struct SigningKey {
    key: HS256Key,
    fingerprint: KeyFingerprint,
}

impl SigningKey {
    /// Derive the signing key from a configured secret
    pub fn from_secret(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(NotekeepError::validation(
                "token_secret",
                format!("must be at least {} bytes", MIN_SECRET_LEN),
            ));
        }

        let hkdf = Hkdf::<Sha256>::new(Some(DERIVATION_SALT), secret);
        let mut okm = [0u8; KEY_LEN];
        hkdf.expand(DERIVATION_INFO, &mut okm)
            .map_err(|e| NotekeepError::Internal(format!("key derivation failed: {}", e)))?;

        Ok(Self::from_raw(okm))
    }

    /// Generate a random signing key (tokens will not outlive the process)
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_raw(bytes)
    }

    fn from_raw(bytes: [u8; KEY_LEN]) -> Self {
        SigningKey {
            key: HS256Key::from_bytes(&bytes),
            fingerprint: KeyFingerprint::of(&bytes),
        }
    }

    pub(crate) fn hs256(&self) -> &HS256Key {
        &self.key
    }

    /// Non-secret identifier, safe to log
    pub fn fingerprint(&self) -> &KeyFingerprint {
        &self.fingerprint
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

/// Short SHA-256 fingerprint of key material
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyFingerprint(String);

impl KeyFingerprint {
    fn of(key_bytes: &[u8]) -> Self {
        let digest = Sha256::digest(key_bytes);
        KeyFingerprint(hex::encode(&digest[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

mod hex {
    use std::fmt::Write;

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut output, b| {
            let _ = write!(output, "{:02x}", b);
            output
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let first = SigningKey::from_secret(b"correct horse battery staple").unwrap();
        let second = SigningKey::from_secret(b"correct horse battery staple").unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());

        let other = SigningKey::from_secret(b"a different secret value").unwrap();
        assert_ne!(first.fingerprint(), other.fingerprint());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = SigningKey::from_secret(b"short").unwrap_err();
        assert!(matches!(err, NotekeepError::Validation { field: "token_secret", .. }));
    }

    #[test]
    fn test_generated_keys_differ() {
        let first = SigningKey::generate();
        let second = SigningKey::generate();
        assert_ne!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.fingerprint().as_str().len(), 16);
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = SigningKey::from_secret(b"correct horse battery staple").unwrap();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains(key.fingerprint().as_str()));
    }
}
