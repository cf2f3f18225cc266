//! notekeep HTTP server
//!
//! Serves the account and note endpoints over hyper, backed by the fjall
//! storage engine and the token service from `notekeep-core`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::NotekeepServer;
pub use state::AppState;
