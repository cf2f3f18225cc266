//! Shared per-process handles passed to every request

use notekeep_core::auth::{IdentityResolver, TokenService};
use notekeep_core::{CredentialStore, NoteStore};
use notekeep_engine::StorageEngine;
use std::sync::Arc;

/// Store handles and the token service, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn CredentialStore>,
    pub notes: Arc<dyn NoteStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        notes: Arc<dyn NoteStore>,
        tokens: TokenService,
    ) -> Self {
        AppState {
            users,
            notes,
            tokens: Arc::new(tokens),
        }
    }

    /// Wire both stores to one fjall engine
    pub fn from_engine(engine: &StorageEngine, tokens: TokenService) -> Self {
        Self::new(Arc::new(engine.users()), Arc::new(engine.notes()), tokens)
    }

    pub fn resolver(&self) -> IdentityResolver<'_, dyn CredentialStore> {
        IdentityResolver::new(&self.tokens, self.users.as_ref())
    }
}
