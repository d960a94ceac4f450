//! File-backed implementation of the `CredentialService` trait.

use async_trait::async_trait;

use crate::config::AuthConfig;
use crate::db::UserRepository;
use crate::models::Identity;
use crate::services::auth_service::{AuthError, CredentialService};

pub struct FileCredentialService {
    users: UserRepository,
    policy: AuthConfig,
}

impl FileCredentialService {
    #[must_use]
    pub const fn new(users: UserRepository, policy: AuthConfig) -> Self {
        Self { users, policy }
    }

    fn check_input(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.chars().count() < self.policy.min_username_length {
            return Err(AuthError::UsernameTooShort(self.policy.min_username_length));
        }
        if password.chars().count() < self.policy.min_password_length {
            return Err(AuthError::PasswordTooShort(self.policy.min_password_length));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialService for FileCredentialService {
    async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_input(username, password)?;

        let user = self
            .users
            .get_by_username(username)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !self.users.verify_password(&user, password).await? {
            return Err(AuthError::InvalidPassword);
        }

        Ok(Identity::from(&user))
    }

    async fn register(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        self.check_input(username, password)?;

        let user = self
            .users
            .insert(username, password)
            .await?
            .ok_or(AuthError::UsernameTaken)?;

        Ok(Identity::from(&user))
    }
}
