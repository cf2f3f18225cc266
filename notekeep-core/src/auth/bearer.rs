//! `Authorization: Bearer <token>` header parsing

use crate::{NotekeepError, Result};

/// Authentication scheme advertised in `WWW-Authenticate`
pub const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively. A missing header, another
/// scheme, or an empty token all fail with `Unauthorized`.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str> {
    let value = authorization.ok_or(NotekeepError::Unauthorized)?.trim();

    let (scheme, token) = value
        .split_once(char::is_whitespace)
        .ok_or(NotekeepError::Unauthorized)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(NotekeepError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(NotekeepError::Unauthorized);
    }

    Ok(token)
}
