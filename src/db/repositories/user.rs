use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::write_replacing;
use crate::models::User;

/// Accounts persisted as a JSON array next to the catalog document.
#[derive(Clone)]
pub struct UserRepository {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
    security: SecurityConfig,
}

impl UserRepository {
    pub async fn open(path: impl Into<PathBuf>, security: SecurityConfig) -> Result<Self> {
        let repo = Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
            security,
        };

        let exists = tokio::fs::try_exists(repo.path())
            .await
            .with_context(|| format!("Failed to inspect {}", repo.path().display()))?;

        if !exists {
            if let Some(parent) = repo.path().parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            repo.save(&[]).await?;
            info!("Created empty user file at {}", repo.path().display());
        }

        Ok(repo)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.load().await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    /// Hashes the password and stores a new account. Returns `None` when the
    /// username is already taken.
    pub async fn insert(&self, username: &str, password: &str) -> Result<Option<User>> {
        let password = password.to_string();
        let security = self.security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        if users.iter().any(|u| u.username == username) {
            return Ok(None);
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: password_hash,
        };
        users.push(user.clone());
        self.save(&users).await?;

        info!(user_id = %user.id, username = %user.username, "User created");
        Ok(Some(user))
    }

    /// Verify password for a user
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let password_hash = user.password.clone();
        let password = password.to_string();

        task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")?
    }

    async fn load(&self) -> Result<Vec<User>> {
        let raw = tokio::fs::read(self.path())
            .await
            .with_context(|| format!("Failed to read {}", self.path().display()))?;
        serde_json::from_slice(&raw)
            .with_context(|| format!("Malformed user file {}", self.path().display()))
    }

    async fn save(&self, users: &[User]) -> Result<()> {
        let content = serde_json::to_vec_pretty(users)?;
        write_replacing(self.path(), &content).await?;
        Ok(())
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
