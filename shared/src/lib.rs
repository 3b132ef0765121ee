//! Backend services around the domain crate: authentication, account
//! flows, remembered credentials and runtime configuration.

pub mod account;
pub mod auth;
pub mod config;
pub mod messages;
pub mod remember;
pub mod state;

pub use auth::{AuthContext, AuthError, AuthProvider, AuthSession};
pub use config::{Config, ConfigError};
pub use state::AppState;
