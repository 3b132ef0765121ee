//! Authentication port and its adapters.

pub mod cognito;
pub mod memory;
pub mod request;

use async_trait::async_trait;
use gth_atoms::AuthUser;
use serde::Serialize;
use thiserror::Error;

pub use cognito::CognitoAuthProvider;
pub use memory::InMemoryAuthProvider;
pub use request::{authenticate, bearer_token, request_cookie, AuthContext, ACCESS_TOKEN_COOKIE};

pub type AuthResult<T> = Result<T, AuthError>;

/// Provider failures, reduced to the cases the app reacts to.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("wrong password")]
    WrongPassword,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("network request failed: {0}")]
    NetworkRequestFailed(String),
    #[error("too many requests")]
    TooManyRequests,
    #[error("email already in use")]
    EmailAlreadyInUse,
    #[error("invalid email")]
    InvalidEmail,
    #[error("user not found")]
    UserNotFound,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("{0}")]
    Other(String),
}

/// A signed-in user and the tokens that identify the session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and return it already signed in.
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    /// Invalidate every token issued for the session's user.
    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;

    async fn send_password_reset(&self, email: &str) -> AuthResult<()>;

    /// Verify the current password without starting a new session.
    async fn reauthenticate(&self, email: &str, password: &str) -> AuthResult<()>;

    async fn update_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()>;

    async fn update_display_name(&self, access_token: &str, display_name: &str) -> AuthResult<()>;

    /// Resolve an access token to its user.
    async fn current_user(&self, access_token: &str) -> AuthResult<AuthUser>;
}
