use tracing::info;

use super::RepoError;
use crate::db::{Store, StoreError};
use crate::models::{Anime, AnimeInput, Review};

#[derive(Clone)]
pub struct AnimeRepository {
    store: Store,
}

impl AnimeRepository {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// All animes, or only those matching `query` (already lowercased).
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Anime>, StoreError> {
        let document = self.store.read().await?;
        Ok(match query {
            Some(needle) => document
                .animes
                .into_iter()
                .filter(|anime| anime.matches(needle))
                .collect(),
            None => document.animes,
        })
    }

    pub async fn get(&self, raw_id: &str) -> Result<Option<Anime>, StoreError> {
        let mut document = self.store.read().await?;
        Ok(document
            .anime_position(raw_id)
            .map(|idx| document.animes.swap_remove(idx)))
    }

    /// The anime together with the reviews that reference it.
    pub async fn get_with_reviews(
        &self,
        raw_id: &str,
    ) -> Result<Option<(Anime, Vec<Review>)>, StoreError> {
        let mut document = self.store.read().await?;
        let Some(idx) = document.anime_position(raw_id) else {
            return Ok(None);
        };
        let anime = document.animes.swap_remove(idx);
        let reviews = document
            .reviews
            .into_iter()
            .filter(|review| review.anime_id == anime.id)
            .collect();
        Ok(Some((anime, reviews)))
    }

    /// The anime with the numerically highest id.
    pub async fn latest(&self) -> Result<Option<Anime>, StoreError> {
        let document = self.store.read().await?;
        Ok(document.latest_anime().cloned())
    }

    pub async fn create(&self, input: AnimeInput) -> Result<Anime, StoreError> {
        let anime = self
            .store
            .update(|document| {
                let anime = Anime::new(document.next_anime_id()?, input);
                document.animes.push(anime.clone());
                Ok::<_, StoreError>(anime)
            })
            .await?;

        info!(anime_id = anime.id, title = %anime.title, "Anime created");
        Ok(anime)
    }

    pub async fn update(&self, raw_id: &str, input: AnimeInput) -> Result<Anime, RepoError> {
        let anime = self
            .store
            .update(|document| {
                let idx = document
                    .anime_position(raw_id)
                    .ok_or(RepoError::NotFound("Anime"))?;
                let anime = &mut document.animes[idx];
                anime.apply(input);
                Ok::<_, RepoError>(anime.clone())
            })
            .await?;

        info!(anime_id = anime.id, "Anime updated");
        Ok(anime)
    }

    /// Reviews pointing at the deleted anime are left in place.
    pub async fn delete(&self, raw_id: &str) -> Result<(), RepoError> {
        self.store
            .update(|document| {
                let before = document.animes.len();
                document.animes.retain(|a| a.id.to_string() != raw_id);
                if document.animes.len() == before {
                    return Err(RepoError::NotFound("Anime"));
                }
                Ok(())
            })
            .await?;

        info!(anime_id = raw_id, "Anime deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fields;

    async fn repo() -> AnimeRepository {
        let path = std::env::temp_dir()
            .join(format!("anishelf-anime-{}", uuid::Uuid::new_v4()))
            .join("db.json");
        Store::open(path).await.unwrap().animes()
    }

    fn input(title: &str, genres: &str) -> AnimeInput {
        AnimeInput::from_fields(&Fields::new().with("title", title).with("genres", genres))
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let repo = repo().await;
        assert_eq!(repo.create(input("A", "")).await.unwrap().id, 1);
        assert_eq!(repo.create(input("B", "")).await.unwrap().id, 2);
        assert_eq!(repo.create(input("C", "")).await.unwrap().id, 3);

        repo.delete("2").await.unwrap();
        assert_eq!(repo.create(input("D", "")).await.unwrap().id, 4);

        repo.delete("4").await.unwrap();
        assert_eq!(repo.create(input("E", "")).await.unwrap().id, 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_are_all_kept() {
        let repo = repo().await;

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(input(&format!("A{i}"), "")).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, (1..=50).collect::<Vec<u32>>());
        assert_eq!(repo.list(None).await.unwrap().len(), 50);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = repo().await;
        repo.create(input("A", "")).await.unwrap();

        assert!(matches!(
            repo.delete("9").await,
            Err(RepoError::NotFound("Anime"))
        ));
        assert_eq!(repo.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_missing_leaves_store_unchanged() {
        let repo = repo().await;
        let created = repo.create(input("A", "Drama")).await.unwrap();

        assert!(matches!(
            repo.update("5", input("B", "")).await,
            Err(RepoError::NotFound(_))
        ));
        assert_eq!(repo.list(None).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_list_filters_case_insensitively() {
        let repo = repo().await;
        repo.create(input("Mechanical Heart", "Drama")).await.unwrap();
        repo.create(input("Slow Days", "Mecha, Comedy")).await.unwrap();
        repo.create(input("Other", "Sports")).await.unwrap();

        let found = repo.list(Some("mecha")).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(repo.list(None).await.unwrap().len(), 3);
    }
}
