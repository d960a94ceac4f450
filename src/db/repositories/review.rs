use chrono::Utc;
use tracing::info;

use super::RepoError;
use crate::db::{Store, StoreError};
use crate::models::{Anime, Fields, Review, ReviewInput};

/// Optional list filters; `query` must already be lowercased.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub anime_id: Option<String>,
    pub query: Option<String>,
}

pub struct ReviewRepository {
    store: Store,
}

impl ReviewRepository {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Matching reviews plus the full anime list for building filter selectors.
    pub async fn list(
        &self,
        filter: &ReviewFilter,
    ) -> Result<(Vec<Review>, Vec<Anime>), StoreError> {
        let document = self.store.read().await?;
        let reviews = document
            .reviews
            .into_iter()
            .filter(|review| review.matches(filter.anime_id.as_deref(), filter.query.as_deref()))
            .collect();
        Ok((reviews, document.animes))
    }

    /// The review joined with its anime, which is `None` once that anime has
    /// been deleted.
    pub async fn get(&self, raw_id: &str) -> Result<Option<(Review, Option<Anime>)>, StoreError> {
        let document = self.store.read().await?;
        Ok(document.review_position(raw_id).map(|idx| {
            let review = document.reviews[idx].clone();
            let anime = document.anime_by_id(review.anime_id).cloned();
            (review, anime)
        }))
    }

    /// The review and the anime list for the edit form.
    pub async fn get_for_edit(
        &self,
        raw_id: &str,
    ) -> Result<Option<(Review, Vec<Anime>)>, StoreError> {
        let mut document = self.store.read().await?;
        Ok(document
            .review_position(raw_id)
            .map(|idx| (document.reviews.swap_remove(idx), document.animes)))
    }

    pub async fn create(&self, fields: &Fields) -> Result<Review, RepoError> {
        let review = self
            .store
            .update(|document| {
                let input = ReviewInput::for_create(fields, &document.animes)?;
                let review = Review::new(document.next_review_id()?, input, Utc::now());
                document.reviews.push(review.clone());
                Ok::<_, RepoError>(review)
            })
            .await?;

        info!(
            review_id = review.id,
            anime_id = review.anime_id,
            "Review created"
        );
        Ok(review)
    }

    pub async fn update(&self, raw_id: &str, fields: &Fields) -> Result<Review, RepoError> {
        let review = self
            .store
            .update(|document| {
                let idx = document
                    .review_position(raw_id)
                    .ok_or(RepoError::NotFound("Review"))?;
                let input = ReviewInput::for_update(fields, &document.animes)?;
                let review = &mut document.reviews[idx];
                review.apply(input);
                Ok::<_, RepoError>(review.clone())
            })
            .await?;

        info!(review_id = review.id, "Review updated");
        Ok(review)
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), RepoError> {
        self.store
            .update(|document| {
                let before = document.reviews.len();
                document.reviews.retain(|r| r.id.to_string() != raw_id);
                if document.reviews.len() == before {
                    return Err(RepoError::NotFound("Review"));
                }
                Ok(())
            })
            .await?;

        info!(review_id = raw_id, "Review deleted");
        Ok(())
    }
}
