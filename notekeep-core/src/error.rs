//! Error types for notekeep

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotekeepError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Username already registered: {0}")]
    Conflict(String),

    /// Missing, malformed, expired or orphaned bearer token
    #[error("Could not validate credentials")]
    Unauthorized,

    /// Login failure; one message for unknown users and wrong passwords
    #[error("Incorrect username or password")]
    InvalidCredentials,

    /// Absent notes and notes owned by someone else look the same
    #[error("Note not found or unauthorized")]
    NoteNotFound,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NotekeepError {
    /// Build a validation error for a named input field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        NotekeepError::Validation {
            field,
            message: message.into(),
        }
    }

    /// True for failures caused by the caller rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            NotekeepError::Validation { .. }
                | NotekeepError::Conflict(_)
                | NotekeepError::Unauthorized
                | NotekeepError::InvalidCredentials
                | NotekeepError::NoteNotFound
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_and_server_errors() {
        assert!(NotekeepError::validation("title", "empty").is_client_error());
        assert!(NotekeepError::Conflict("alice".into()).is_client_error());
        assert!(NotekeepError::Unauthorized.is_client_error());
        assert!(NotekeepError::InvalidCredentials.is_client_error());
        assert!(NotekeepError::NoteNotFound.is_client_error());

        assert!(!NotekeepError::Storage("disk".into()).is_client_error());
        assert!(!NotekeepError::Internal("oops".into()).is_client_error());
        assert!(!NotekeepError::Io(std::io::Error::other("eof")).is_client_error());
    }

    #[test]
    fn test_validation_names_the_field() {
        let err = NotekeepError::validation("username", "must not be empty");
        assert_eq!(err.to_string(), "Invalid username: must not be empty");
    }
}
