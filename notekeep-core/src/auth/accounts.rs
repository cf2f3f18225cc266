//! Registration and login flows

use crate::auth::{hash_password, timing, verify_password, AccessToken, TokenService};
use crate::{CredentialStore, NotekeepError, Result, User, Username};
use tracing::debug;

/// Create an account from raw credentials
pub fn register<S: CredentialStore + ?Sized>(
    users: &S,
    username: &str,
    password: &str,
) -> Result<User> {
    let username = Username::new(username)?;
    let digest = hash_password(password)?;
    users.create_user(&username, &digest)
}

/// Check credentials and issue an access token.
///
/// Unknown usernames and wrong passwords both yield `InvalidCredentials`
/// after the same amount of hashing work.
pub fn login<S: CredentialStore + ?Sized>(
    users: &S,
    tokens: &TokenService,
    username: &str,
    password: &str,
) -> Result<AccessToken> {
    match users.find_by_username(username)? {
        Some(user) if verify_password(password, &user.password_hash) => tokens.issue(user.id),
        Some(user) => {
            debug!("Login rejected for user {}", user.id);
            Err(NotekeepError::InvalidCredentials)
        }
        None => {
            timing::burn_password_check(password);
            Err(NotekeepError::InvalidCredentials)
        }
    }
}
