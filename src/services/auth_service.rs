//! Domain service for account creation and credential checks.

use thiserror::Error;

use crate::models::Identity;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username must be at least {0} characters long")]
    UsernameTooShort(usize),

    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Username does not exist")]
    UnknownUser,

    #[error("Password is invalid")]
    InvalidPassword,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait CredentialService: Send + Sync {
    /// Verifies credentials and returns the session identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownUser`] or [`AuthError::InvalidPassword`]
    /// when login fails.
    async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError>;

    /// Creates an account and returns its identity.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for short input and
    /// [`AuthError::UsernameTaken`] for duplicates.
    async fn register(&self, username: &str, password: &str) -> Result<Identity, AuthError>;
}
