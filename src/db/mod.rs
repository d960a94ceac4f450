//! Flat-file JSON store.
//!
//! The whole catalog lives in one JSON document that is read in full,
//! mutated in memory and written back in full. Writers inside one process are
//! serialized by [`Store::update`]; nothing coordinates separate processes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::models::{Anime, Review};

pub mod repositories;

pub use repositories::anime::AnimeRepository;
pub use repositories::review::{ReviewFilter, ReviewRepository};
pub use repositories::user::UserRepository;
pub use repositories::RepoError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed data in {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("No {0} ids left")]
    IdsExhausted(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub animes: Vec<Anime>,

    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Document {
    pub fn next_anime_id(&self) -> Result<u32, StoreError> {
        next_id(self.animes.iter().map(|a| a.id), "anime")
    }

    pub fn next_review_id(&self) -> Result<u32, StoreError> {
        next_id(self.reviews.iter().map(|r| r.id), "review")
    }

    /// Ids are matched by their decimal text, so `"01"` does not find `1`.
    #[must_use]
    pub fn anime_position(&self, raw_id: &str) -> Option<usize> {
        self.animes.iter().position(|a| a.id.to_string() == raw_id)
    }

    #[must_use]
    pub fn review_position(&self, raw_id: &str) -> Option<usize> {
        self.reviews.iter().position(|r| r.id.to_string() == raw_id)
    }

    #[must_use]
    pub fn anime_by_id(&self, id: u32) -> Option<&Anime> {
        self.animes.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn latest_anime(&self) -> Option<&Anime> {
        self.animes.iter().max_by_key(|a| a.id)
    }
}

fn next_id(ids: impl Iterator<Item = u32>, kind: &'static str) -> Result<u32, StoreError> {
    ids.max()
        .map_or(Some(1), |max| max.checked_add(1))
        .ok_or(StoreError::IdsExhausted(kind))
}

#[derive(Clone)]
pub struct Store {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    /// Opens the document at `path`, creating an empty one if the file does
    /// not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        };

        let exists = tokio::fs::try_exists(store.path())
            .await
            .map_err(|source| StoreError::Read {
                path: store.path().to_path_buf(),
                source,
            })?;

        if !exists {
            if let Some(parent) = store.path().parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StoreError::Write {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
            store.persist(&Document::default()).await?;
            info!("Created empty data file at {}", store.path().display());
        }

        Ok(store)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<Document, StoreError> {
        let raw = tokio::fs::read(self.path())
            .await
            .map_err(|source| StoreError::Read {
                path: self.path().to_path_buf(),
                source,
            })?;

        serde_json::from_slice(&raw).map_err(|source| StoreError::Malformed {
            path: self.path().to_path_buf(),
            source,
        })
    }

    /// Replaces the whole document.
    pub async fn write(&self, document: &Document) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.persist(document).await
    }

    /// Read-modify-write under the store lock. Nothing is written when `f`
    /// returns an error.
    pub async fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read().await?;
        let output = f(&mut document)?;
        self.persist(&document).await?;
        Ok(output)
    }

    #[must_use]
    pub fn animes(&self) -> AnimeRepository {
        AnimeRepository::new(self.clone())
    }

    #[must_use]
    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new(self.clone())
    }

    async fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let mut content = serde_json::to_vec_pretty(document)?;
        content.push(b'\n');
        write_replacing(self.path(), &content).await?;
        debug!(
            animes = document.animes.len(),
            reviews = document.reviews.len(),
            "Data file written"
        );
        Ok(())
    }
}

/// Writes to a sibling temp file and renames it over `path`.
pub(crate) async fn write_replacing(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    tokio::fs::write(&tmp, content).await.map_err(write_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(write_err)
}
