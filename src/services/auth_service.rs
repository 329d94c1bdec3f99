//! Domain service for registration and login.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email/password")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Public view of a freshly registered user.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user with a hashed password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] on duplicate email or malformed
    /// input.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, AuthError>;

    /// Verifies credentials and returns a signed bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the email is unknown or
    /// the password does not match; callers cannot tell which.
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError>;
}
