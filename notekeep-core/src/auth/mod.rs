//! Authentication and authorization for notekeep
//!
//! This module implements the identity plane with:
//! - Argon2id password hashing and verification
//! - HS256 signing keys derived from a configured secret
//! - Stateless, time-limited bearer tokens
//! - Per-request identity resolution and the register/login flows

pub mod accounts;
pub mod bearer;
pub mod keys;
pub mod password;
pub mod resolver;
pub mod timing;
pub mod token;

pub use accounts::*;
pub use bearer::*;
pub use keys::*;
pub use password::*;
pub use resolver::*;
pub use token::*;
