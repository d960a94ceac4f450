use thiserror::Error;

use super::StoreError;
use crate::models::Rejection;

pub mod anime;
pub mod review;
pub mod user;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error(transparent)]
    Store(#[from] StoreError),
}
