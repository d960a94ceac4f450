use serde::{Deserialize, Serialize};

use super::fields::Fields;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Anime {
    pub id: u32,
    pub title: String,
    pub studio: String,
    #[serde(deserialize_with = "super::lenient::whole_u32")]
    pub episodes: u32,
    pub status: String,
    #[serde(deserialize_with = "super::lenient::year")]
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub synopsis: String,
    pub image_url: String,
}

/// Normalized anime input. `None` means the field was not submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimeInput {
    pub title: Option<String>,
    pub studio: Option<String>,
    pub episodes: Option<u32>,
    pub status: Option<String>,
    pub year: Option<Option<i32>>,
    pub genres: Option<Vec<String>>,
    pub synopsis: Option<String>,
    pub image_url: Option<String>,
}

impl AnimeInput {
    /// Episodes that do not parse (or are negative) become 0; a year that
    /// does not parse, or is 0, becomes null.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            title: fields.text("title"),
            studio: fields.text("studio"),
            episodes: fields
                .number("episodes")
                .map(|n| n.filter(|n| *n > 0.0).map_or(0, |n| n.trunc() as u32)),
            status: fields.text("status"),
            year: fields
                .number("year")
                .map(|n| n.map(f64::trunc).filter(|n| *n != 0.0).map(|n| n as i32)),
            genres: fields.list("genres"),
            synopsis: fields.text("synopsis"),
            image_url: fields.text("imageUrl"),
        }
    }
}

impl Anime {
    #[must_use]
    pub fn new(id: u32, input: AnimeInput) -> Self {
        let mut anime = Self {
            id,
            ..Self::default()
        };
        anime.apply(input);
        anime
    }

    /// Overwrites every submitted field, keeping the stored value of the rest.
    pub fn apply(&mut self, input: AnimeInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(studio) = input.studio {
            self.studio = studio;
        }
        if let Some(episodes) = input.episodes {
            self.episodes = episodes;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(year) = input.year {
            self.year = year;
        }
        if let Some(genres) = input.genres {
            self.genres = genres;
        }
        if let Some(synopsis) = input.synopsis {
            self.synopsis = synopsis;
        }
        if let Some(image_url) = input.image_url {
            self.image_url = image_url;
        }
    }

    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.studio.to_lowercase().contains(needle)
            || self.status.to_lowercase().contains(needle)
            || self.genres.join(" ").to_lowercase().contains(needle)
    }
}
