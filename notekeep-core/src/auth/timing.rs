//! Timing equalization for credential checks
//!
//! A login for an unknown username still pays for one Argon2 verification, so
//! response time does not reveal whether the account exists. Call [`warm_up`]
//! at startup so the first such login does not also pay for building the
//! dummy digest.

use crate::auth::{hash_password, verify_password};
use crate::Result;
use std::sync::OnceLock;
use tracing::warn;

const DUMMY_PLAINTEXT: &str = "notekeep-timing-equalizer";

static DUMMY_DIGEST: OnceLock<String> = OnceLock::new();

/// Build the dummy digest ahead of the first login
pub fn warm_up() -> Result<()> {
    dummy_digest().map(|_| ())
}

/// A valid digest that no real password is checked against
pub fn dummy_digest() -> Result<&'static str> {
    if let Some(digest) = DUMMY_DIGEST.get() {
        return Ok(digest);
    }

    let digest = hash_password(DUMMY_PLAINTEXT)?;
    Ok(DUMMY_DIGEST.get_or_init(|| digest))
}

/// Spend the cost of one password verification and discard the result
pub fn burn_password_check(plaintext: &str) {
    match dummy_digest() {
        Ok(digest) => {
            let _ = verify_password(plaintext, digest);
        }
        Err(e) => warn!("Login timing equalization unavailable: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_up_fixes_the_digest() {
        warm_up().unwrap();
        let first = DUMMY_DIGEST.get().unwrap().as_str();

        warm_up().unwrap();
        let second = dummy_digest().unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password(DUMMY_PLAINTEXT, first));
    }

    #[test]
    fn test_burn_accepts_any_input() {
        burn_password_check("");
        burn_password_check("whatever");
    }
}
