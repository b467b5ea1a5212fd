//! Passport Server - REST access to per-user country collectors.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{Config, StorageBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
