//! Per-request identity resolution

use crate::auth::{bearer_token, TokenService};
use crate::{CredentialStore, Identity, NotekeepError, Result};
use tracing::debug;

/// Turns an `Authorization` header into the caller's identity.
///
/// Runs before any protected handler. Tokens for users that no longer exist
/// are not honored. Store failures propagate unchanged.
pub struct IdentityResolver<'a, S: CredentialStore + ?Sized> {
    tokens: &'a TokenService,
    users: &'a S,
}

impl<'a, S: CredentialStore + ?Sized> IdentityResolver<'a, S> {
    pub fn new(tokens: &'a TokenService, users: &'a S) -> Self {
        IdentityResolver { tokens, users }
    }

    /// Resolve the identity behind a raw header value
    pub fn resolve(&self, authorization: Option<&str>) -> Result<Identity> {
        let token = bearer_token(authorization)?;
        let user_id = self.tokens.verify(token)?;

        match self.users.find_by_id(user_id)? {
            Some(user) => Ok(Identity::from(&user)),
            None => {
                debug!("Token subject {} no longer exists", user_id);
                Err(NotekeepError::Unauthorized)
            }
        }
    }
}
