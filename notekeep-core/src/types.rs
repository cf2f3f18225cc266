//! Core data types for notekeep

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted username, in characters
pub const MAX_USERNAME_LEN: usize = 50;

/// Longest accepted note title, in characters
pub const MAX_TITLE_LEN: usize = 100;

/// System-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub fn new(id: u64) -> Self {
        UserId(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// System-assigned note identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(u64);

impl NoteId {
    pub fn new(id: u64) -> Self {
        NoteId(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique login name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Create a new username with validation
    pub fn new(name: &str) -> crate::Result<Self> {
        if name.trim().is_empty() {
            return Err(crate::NotekeepError::validation("username", "must not be empty"));
        }

        if name.chars().count() > MAX_USERNAME_LEN {
            return Err(crate::NotekeepError::validation(
                "username",
                format!("must be at most {} characters", MAX_USERNAME_LEN),
            ));
        }

        if name.chars().any(|c| c.is_control()) {
            return Err(crate::NotekeepError::validation(
                "username",
                "control characters not allowed",
            ));
        }

        Ok(Username(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated note title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteTitle(String);

impl NoteTitle {
    /// Create a new title with validation
    pub fn new(title: &str) -> crate::Result<Self> {
        if title.trim().is_empty() {
            return Err(crate::NotekeepError::validation("title", "must not be empty"));
        }

        if title.chars().count() > MAX_TITLE_LEN {
            return Err(crate::NotekeepError::validation(
                "title",
                format!("must be at most {} characters", MAX_TITLE_LEN),
            ));
        }

        Ok(NoteTitle(title.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored user record
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    /// PHC-format digest, never the plaintext
    pub password_hash: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Minimal authenticated identity handed to protected handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            id: user.id,
            username: user.username.as_str().to_string(),
        }
    }
}

/// A note owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner_id: UserId,
    pub title: String,
    pub content: String,
}

/// Chooses which note a delete targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSelector {
    Id(NoteId),
    Title(String),
    /// Digit-only selector: tried as an id first, then as a title
    IdOrTitle(NoteId, String),
}

impl NoteSelector {
    /// Interpret a raw path segment
    pub fn parse(raw: &str) -> crate::Result<Self> {
        if raw.is_empty() {
            return Err(crate::NotekeepError::validation("selector", "must not be empty"));
        }

        if raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<u64>() {
                return Ok(NoteSelector::IdOrTitle(NoteId::new(id), raw.to_string()));
            }
        }

        Ok(NoteSelector::Title(raw.to_string()))
    }

    /// Id to try first, if any
    pub fn id(&self) -> Option<NoteId> {
        match self {
            NoteSelector::Id(id) | NoteSelector::IdOrTitle(id, _) => Some(*id),
            NoteSelector::Title(_) => None,
        }
    }

    /// Title to match when no id matched
    pub fn title(&self) -> Option<&str> {
        match self {
            NoteSelector::Title(title) | NoteSelector::IdOrTitle(_, title) => Some(title),
            NoteSelector::Id(_) => None,
        }
    }
}

impl fmt::Display for NoteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteSelector::Id(id) => write!(f, "id={}", id),
            NoteSelector::Title(title) => write!(f, "title={:?}", title),
            NoteSelector::IdOrTitle(id, _) => write!(f, "id-or-title={}", id),
        }
    }
}
