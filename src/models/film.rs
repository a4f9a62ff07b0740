//! Movies and episodes.
//!
//! Both are persisted in the `films` table; the storage layer tells them apart
//! by the discriminator columns. Above the repository they are distinct types
//! and [`Film`] is the tagged union over them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The user-editable part shared by movies and episodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmContent {
    pub title: String,
    pub descriptions: Option<String>,
    pub date_released: NaiveDate,
    /// Runtime in minutes
    pub duration: Option<i32>,
}

impl FilmContent {
    #[must_use]
    pub fn new(title: impl Into<String>, date_released: NaiveDate) -> Self {
        Self {
            title: title.into(),
            descriptions: None,
            date_released,
            duration: None,
        }
    }
}

/// Natural key of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpisodeKey {
    pub series_id: i32,
    pub season_number: i32,
    pub episode_number: i32,
}

impl EpisodeKey {
    #[must_use]
    pub const fn new(series_id: i32, season_number: i32, episode_number: i32) -> Self {
        Self {
            series_id,
            season_number,
            episode_number,
        }
    }
}

impl fmt::Display for EpisodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "series {} S{:02}E{:02}",
            self.series_id, self.season_number, self.episode_number
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    #[serde(flatten)]
    pub content: FilmContent,
    pub contributed_by: i32,
    pub contributed_at: DateTime<Utc>,
    pub invalidation: Option<String>,
}

impl Movie {
    #[must_use]
    pub fn new(content: FilmContent) -> Self {
        Self {
            id: 0,
            content,
            contributed_by: 0,
            contributed_at: Utc::now(),
            invalidation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub id: i32,
    #[serde(flatten)]
    pub key: EpisodeKey,
    #[serde(flatten)]
    pub content: FilmContent,
    pub contributed_by: i32,
    pub contributed_at: DateTime<Utc>,
    pub invalidation: Option<String>,
}

impl Episode {
    #[must_use]
    pub fn new(key: EpisodeKey, content: FilmContent) -> Self {
        Self {
            id: 0,
            key,
            content,
            contributed_by: 0,
            contributed_at: Utc::now(),
            invalidation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Film {
    Movie(Movie),
    Episode(Episode),
}

impl Film {
    #[must_use]
    pub const fn id(&self) -> i32 {
        match self {
            Self::Movie(m) => m.id,
            Self::Episode(e) => e.id,
        }
    }

    #[must_use]
    pub fn into_movie(self) -> Option<Movie> {
        match self {
            Self::Movie(m) => Some(m),
            Self::Episode(_) => None,
        }
    }

    #[must_use]
    pub fn into_episode(self) -> Option<Episode> {
        match self {
            Self::Episode(e) => Some(e),
            Self::Movie(_) => None,
        }
    }
}

/// Sparse update of a movie or episode. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilmPatch {
    pub title: Option<String>,
    pub descriptions: Option<String>,
    pub date_released: Option<NaiveDate>,
    pub duration: Option<i32>,
}
