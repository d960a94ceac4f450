use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::anime::Anime;
use super::fields::Fields;
use crate::constants::reviews::{ANONYMOUS_AUTHOR, MAX_RATING, MIN_RATING, MIN_TITLE_LEN};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: u32,
    pub anime_id: u32,
    #[serde(default)]
    pub author: String,
    #[serde(default, deserialize_with = "super::lenient::whole_u8")]
    pub rating: u8,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Why a review write was refused. Checks run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Invalid anime")]
    InvalidAnime,

    #[error("Title too short")]
    TitleTooShort,

    #[error("Rating must be between 0 and 10")]
    RatingOutOfRange,
}

/// Validated review input. `None` means the field was not submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub anime_id: u32,
    pub author: Option<String>,
    pub rating: Option<u8>,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl ReviewInput {
    pub fn for_create(fields: &Fields, animes: &[Anime]) -> Result<Self, Rejection> {
        let anime_id = resolve_anime(fields, animes)?;

        let title = fields.text("title").unwrap_or_default().trim().to_string();
        if title.chars().count() < MIN_TITLE_LEN {
            return Err(Rejection::TitleTooShort);
        }

        let rating = coerce_rating(fields.text("rating").as_deref().unwrap_or_default())?;

        Ok(Self {
            anime_id,
            author: Some(fields.text("author").unwrap_or_default()),
            rating: Some(rating),
            title: Some(title),
            content: Some(fields.text("content").unwrap_or_default()),
        })
    }

    /// Same as [`Self::for_create`] except the title length is not enforced
    /// and omitted fields are left for [`Review::apply`] to keep.
    pub fn for_update(fields: &Fields, animes: &[Anime]) -> Result<Self, Rejection> {
        let anime_id = resolve_anime(fields, animes)?;
        let rating = fields
            .text("rating")
            .map(|raw| coerce_rating(&raw))
            .transpose()?;

        Ok(Self {
            anime_id,
            author: fields.text("author"),
            rating,
            title: fields.text("title").map(|t| t.trim().to_string()),
            content: fields.text("content"),
        })
    }
}

fn resolve_anime(fields: &Fields, animes: &[Anime]) -> Result<u32, Rejection> {
    let raw = fields.text("animeId").unwrap_or_default();
    if raw.is_empty() {
        return Err(Rejection::InvalidAnime);
    }
    animes
        .iter()
        .find(|anime| anime.id.to_string() == raw)
        .map(|anime| anime.id)
        .ok_or(Rejection::InvalidAnime)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn coerce_rating(raw: &str) -> Result<u8, Rejection> {
    let value = super::fields::parse_number(raw).unwrap_or(0.0);
    if !(f64::from(MIN_RATING)..=f64::from(MAX_RATING)).contains(&value) {
        return Err(Rejection::RatingOutOfRange);
    }
    Ok(value.trunc() as u8)
}

fn author_or_anonymous(author: &str) -> String {
    let trimmed = author.trim();
    if trimmed.is_empty() {
        ANONYMOUS_AUTHOR.to_string()
    } else {
        trimmed.to_string()
    }
}

impl Review {
    #[must_use]
    pub fn new(id: u32, input: ReviewInput, created_at: DateTime<Utc>) -> Self {
        let mut review = Self {
            id,
            anime_id: input.anime_id,
            author: ANONYMOUS_AUTHOR.to_string(),
            rating: 0,
            title: String::new(),
            content: String::new(),
            created_at,
        };
        review.apply(input);
        review
    }

    /// `created_at` is never touched.
    pub fn apply(&mut self, input: ReviewInput) {
        self.anime_id = input.anime_id;
        if let Some(author) = input.author {
            self.author = author_or_anonymous(&author);
        }
        if let Some(rating) = input.rating {
            self.rating = rating;
        }
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(content) = input.content {
            self.content = content;
        }
    }

    /// Both filters must hold when given. `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, anime_id: Option<&str>, needle: Option<&str>) -> bool {
        if let Some(anime_id) = anime_id
            && self.anime_id.to_string() != anime_id
        {
            return false;
        }
        needle.is_none_or(|needle| {
            self.title.to_lowercase().contains(needle)
                || self.author.to_lowercase().contains(needle)
        })
    }
}
