//! Core data models, authentication and store contracts for notekeep

pub mod auth;
pub mod error;
pub mod store;
pub mod types;

pub use error::*;
pub use store::*;
pub use types::*;

/// Result type alias for notekeep operations
pub type Result<T> = std::result::Result<T, NotekeepError>;
