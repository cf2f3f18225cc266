//! Stateless bearer tokens
//!
//! Tokens are compact HS256 JWTs carrying `sub` (the user id), `iat`, `nbf`
//! and `exp`. Nothing is stored server side: a token is valid iff its MAC
//! verifies under the process signing key and the current time is strictly
//! before `exp`.

use crate::auth::SigningKey;
use crate::{NotekeepError, Result, UserId};
use jwt_simple::prelude::{Claims, Duration as JwtDuration, MACLike, NoCustomClaims, VerificationOptions};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Seconds since the Unix epoch
pub fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| NotekeepError::Internal(format!("system clock before epoch: {}", e)))
}

/// A freshly issued bearer token
#[derive(Debug, Clone)]
pub struct AccessToken {
    token: String,
    user_id: UserId,
    issued_at: u64,
    expires_at: u64,
}

impl AccessToken {
    /// Get the encoded token string
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn issued_at(&self) -> u64 {
        self.issued_at
    }

    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Lifetime in seconds, as reported to clients
    pub fn expires_in(&self) -> u64 {
        self.expires_at.saturating_sub(self.issued_at)
    }
}

/// Issues and verifies access tokens with one fixed key and TTL
#[derive(Debug, Clone)]
pub struct TokenService {
    key: SigningKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(key: SigningKey, ttl: Duration) -> Result<Self> {
        if ttl.as_secs() == 0 {
            return Err(NotekeepError::validation("token_ttl", "must be at least one second"));
        }

        Ok(TokenService { key, ttl })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }

    /// Issue a token for `user_id` valid from now for the configured TTL
    pub fn issue(&self, user_id: UserId) -> Result<AccessToken> {
        self.issue_at(user_id, unix_now()?)
    }

    /// Issue a token as if the clock read `now` (Unix seconds)
    pub fn issue_at(&self, user_id: UserId, now: u64) -> Result<AccessToken> {
        let expires_at = now.saturating_add(self.ttl.as_secs());

        let mut claims = Claims::create(JwtDuration::from_secs(self.ttl.as_secs()))
            .with_subject(user_id);
        claims.issued_at = Some(JwtDuration::from_secs(now));
        claims.invalid_before = Some(JwtDuration::from_secs(now));
        claims.expires_at = Some(JwtDuration::from_secs(expires_at));

        let token = self
            .key
            .hs256()
            .authenticate(claims)
            .map_err(|e| NotekeepError::Internal(format!("token signing failed: {}", e)))?;

        Ok(AccessToken {
            token,
            user_id,
            issued_at: now,
            expires_at,
        })
    }

    /// Verify a token against the current clock and return its subject
    pub fn verify(&self, token: &str) -> Result<UserId> {
        self.verify_at(token, unix_now()?)
    }

    /// Verify a token as if the clock read `now` (Unix seconds)
    pub fn verify_at(&self, token: &str, now: u64) -> Result<UserId> {
        let options = VerificationOptions {
            time_tolerance: Some(JwtDuration::from_secs(0)),
            artificial_time: Some(JwtDuration::from_secs(now)),
            ..Default::default()
        };

        let claims = self
            .key
            .hs256()
            .verify_token::<NoCustomClaims>(token, Some(options))
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                NotekeepError::Unauthorized
            })?;

        // exp is exclusive: a token stops being accepted at exactly exp
        let expires_at = claims.expires_at.ok_or(NotekeepError::Unauthorized)?;
        if now >= expires_at.as_secs() {
            debug!("Token rejected: expired at {}", expires_at.as_secs());
            return Err(NotekeepError::Unauthorized);
        }

        let subject = claims.subject.ok_or(NotekeepError::Unauthorized)?;
        let id = subject
            .parse::<u64>()
            .map_err(|_| NotekeepError::Unauthorized)?;

        Ok(UserId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_000;

    fn service(ttl_secs: u64) -> TokenService {
        let key = SigningKey::from_secret(b"unit-test-signing-secret").unwrap();
        TokenService::new(key, Duration::from_secs(ttl_secs)).unwrap()
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let tokens = service(1800);
        let issued = tokens.issue(UserId::new(42)).unwrap();

        assert_eq!(tokens.ttl(), Duration::from_secs(1800));
        assert_eq!(issued.user_id(), UserId::new(42));
        assert_eq!(issued.expires_in(), 1800);
        assert_eq!(tokens.verify(issued.token()).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_expiry_boundary() {
        let tokens = service(60);
        let issued = tokens.issue_at(UserId::new(1), T0).unwrap();
        assert_eq!(issued.issued_at(), T0);
        assert_eq!(issued.expires_at(), T0 + 60);

        assert!(tokens.verify_at(issued.token(), T0).is_ok());
        assert!(tokens.verify_at(issued.token(), T0 + 59).is_ok());
        assert!(matches!(
            tokens.verify_at(issued.token(), T0 + 60),
            Err(NotekeepError::Unauthorized)
        ));
        assert!(tokens.verify_at(issued.token(), T0 + 3600).is_err());
    }

    #[test]
    fn test_rejects_foreign_key() {
        let issuer = service(600);
        let other = TokenService::new(
            SigningKey::from_secret(b"some-other-signing-secret").unwrap(),
            Duration::from_secs(600),
        )
        .unwrap();

        let issued = issuer.issue_at(UserId::new(5), T0).unwrap();
        assert!(matches!(
            other.verify_at(issued.token(), T0 + 1),
            Err(NotekeepError::Unauthorized)
        ));
    }

    #[test]
    fn test_rejects_tampered_and_malformed() {
        let tokens = service(600);
        let issued = tokens.issue_at(UserId::new(5), T0).unwrap();

        let token = issued.token();
        let sig_start = token.rfind('.').unwrap() + 1;
        let replacement = if token[sig_start..].starts_with('A') { "B" } else { "A" };
        let tampered = format!("{}{}{}", &token[..sig_start], replacement, &token[sig_start + 1..]);
        assert!(tokens.verify_at(&tampered, T0 + 1).is_err());

        assert!(tokens.verify_at("", T0).is_err());
        assert!(tokens.verify_at("not.a.jwt", T0).is_err());
        assert!(tokens.verify_at("garbage", T0).is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let key = SigningKey::generate();
        assert!(TokenService::new(key, Duration::from_secs(0)).is_err());
    }
}
