//! Persistence contracts consumed by the auth core and the HTTP layer
//!
//! Implementations must make each single-record create/read/delete atomic.
//! Check-then-write sequences (username uniqueness, id allocation) are the
//! implementation's responsibility.

use crate::{Note, NoteSelector, NoteTitle, Result, User, UserId, Username};

/// User identity persistence
pub trait CredentialStore: Send + Sync {
    /// Insert a new user, failing with `Conflict` when the username is taken
    fn create_user(&self, username: &Username, password_hash: &str) -> Result<User>;

    fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    /// Remove a user together with every note they own.
    /// Returns false when no such user existed.
    fn delete_user(&self, id: UserId) -> Result<bool>;
}

/// Owner-scoped note persistence
pub trait NoteStore: Send + Sync {
    /// Always creates a new record
    fn save(&self, owner_id: UserId, title: &NoteTitle, content: &str) -> Result<Note>;

    /// All notes of one owner, ascending by id
    fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<Note>>;

    /// Delete one owned note matching the selector, returning it.
    /// Fails with `NoteNotFound` when nothing owned by `owner_id` matches.
    fn delete(&self, owner_id: UserId, selector: &NoteSelector) -> Result<Note>;
}
