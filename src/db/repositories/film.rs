//! Storage-boundary translation between the flat `films` rows and [`Film`].

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue::NotSet, ColumnTrait, Condition, Set};

use super::RepoError;
use crate::entities::{films, films_audit};
use crate::models::{Episode, EpisodeKey, Film, FilmContent, FilmPatch, Movie};

impl TryFrom<films::Model> for Film {
    type Error = RepoError;

    fn try_from(model: films::Model) -> Result<Self, Self::Error> {
        let content = FilmContent {
            title: model.title,
            descriptions: model.descriptions,
            date_released: model.date_released,
            duration: model.duration,
        };

        match (model.series_id, model.season_number, model.episode_number) {
            (None, None, None) => Ok(Self::Movie(Movie {
                id: model.id,
                content,
                contributed_by: model.contributed_by,
                contributed_at: model.contributed_at,
                invalidation: model.invalidation,
            })),
            (Some(series_id), Some(season_number), Some(episode_number)) => {
                Ok(Self::Episode(Episode {
                    id: model.id,
                    key: EpisodeKey::new(series_id, season_number, episode_number),
                    content,
                    contributed_by: model.contributed_by,
                    contributed_at: model.contributed_at,
                    invalidation: model.invalidation,
                }))
            }
            _ => Err(RepoError::MalformedRow(format!(
                "film {} has partially set discriminator columns",
                model.id
            ))),
        }
    }
}

impl TryFrom<films_audit::Model> for Film {
    type Error = RepoError;

    fn try_from(audit: films_audit::Model) -> Result<Self, Self::Error> {
        Self::try_from(films::Model {
            id: audit.id,
            series_id: audit.series_id,
            season_number: audit.season_number,
            episode_number: audit.episode_number,
            title: audit.title,
            descriptions: audit.descriptions,
            date_released: audit.date_released,
            duration: audit.duration,
            contributed_by: audit.contributed_by,
            contributed_at: audit.contributed_at,
            invalidation: audit.invalidation,
        })
    }
}

pub(super) fn into_movie<M>(model: M) -> Result<Movie, RepoError>
where
    Film: TryFrom<M, Error = RepoError>,
{
    Film::try_from(model)?
        .into_movie()
        .ok_or_else(|| RepoError::MalformedRow("expected a movie, found an episode".to_string()))
}

pub(super) fn into_episode<M>(model: M) -> Result<Episode, RepoError>
where
    Film: TryFrom<M, Error = RepoError>,
{
    Film::try_from(model)?
        .into_episode()
        .ok_or_else(|| RepoError::MalformedRow("expected an episode, found a movie".to_string()))
}

pub(super) fn movie_scope() -> Condition {
    Condition::all()
        .add(films::Column::SeriesId.is_null())
        .add(films::Column::SeasonNumber.is_null())
        .add(films::Column::EpisodeNumber.is_null())
}

pub(super) fn movie_audit_scope() -> Condition {
    Condition::all()
        .add(films_audit::Column::SeriesId.is_null())
        .add(films_audit::Column::SeasonNumber.is_null())
        .add(films_audit::Column::EpisodeNumber.is_null())
}

pub(super) fn episode_scope(key: EpisodeKey) -> Condition {
    season_scope(key.series_id, key.season_number)
        .add(films::Column::EpisodeNumber.eq(key.episode_number))
}

pub(super) fn season_scope(series_id: i32, season_number: i32) -> Condition {
    series_scope(series_id).add(films::Column::SeasonNumber.eq(season_number))
}

/// Every episode of a series. Movies never match because their series id is null.
pub(super) fn series_scope(series_id: i32) -> Condition {
    Condition::all().add(films::Column::SeriesId.eq(series_id))
}

pub(super) fn episode_audit_scope(key: EpisodeKey) -> Condition {
    season_audit_scope(key.series_id, key.season_number)
        .add(films_audit::Column::EpisodeNumber.eq(key.episode_number))
}

pub(super) fn season_audit_scope(series_id: i32, season_number: i32) -> Condition {
    series_audit_scope(series_id).add(films_audit::Column::SeasonNumber.eq(season_number))
}

pub(super) fn series_audit_scope(series_id: i32) -> Condition {
    Condition::all().add(films_audit::Column::SeriesId.eq(series_id))
}

/// Content columns for a fresh row; discriminators are left to the caller.
pub(super) fn content_model(
    content: &FilmContent,
    contributor: i32,
    contributed_at: DateTime<Utc>,
) -> films::ActiveModel {
    films::ActiveModel {
        id: NotSet,
        title: Set(content.title.clone()),
        descriptions: Set(content.descriptions.clone()),
        date_released: Set(content.date_released),
        duration: Set(content.duration),
        contributed_by: Set(contributor),
        contributed_at: Set(contributed_at),
        invalidation: Set(None),
        ..Default::default()
    }
}

/// Submitted fields of `patch` plus the contributor stamp.
pub(super) fn patch_model(patch: FilmPatch, contributor: i32) -> films::ActiveModel {
    let mut active = films::ActiveModel {
        contributed_by: Set(contributor),
        contributed_at: Set(Utc::now()),
        ..Default::default()
    };

    if let Some(title) = patch.title {
        active.title = Set(title);
    }
    if let Some(descriptions) = patch.descriptions {
        active.descriptions = Set(Some(descriptions));
    }
    if let Some(date_released) = patch.date_released {
        active.date_released = Set(date_released);
    }
    if let Some(duration) = patch.duration {
        active.duration = Set(Some(duration));
    }

    active
}

pub(super) fn invalidation_model(invalidation: String, contributor: i32) -> films::ActiveModel {
    films::ActiveModel {
        invalidation: Set(Some(invalidation)),
        contributed_by: Set(contributor),
        contributed_at: Set(Utc::now()),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(series_id: Option<i32>, season: Option<i32>, episode: Option<i32>) -> films::Model {
        films::Model {
            id: 7,
            series_id,
            season_number: season,
            episode_number: episode,
            title: "Pilot".to_string(),
            descriptions: None,
            date_released: NaiveDate::from_ymd_opt(2008, 1, 20).unwrap(),
            duration: Some(58),
            contributed_by: 1,
            contributed_at: Utc::now(),
            invalidation: None,
        }
    }

    #[test]
    fn test_null_discriminators_make_a_movie() {
        let film = Film::try_from(row(None, None, None)).unwrap();
        let movie = film.into_movie().unwrap();
        assert_eq!(movie.id, 7);
        assert_eq!(movie.content.duration, Some(58));
    }

    #[test]
    fn test_full_discriminators_make_an_episode() {
        let film = Film::try_from(row(Some(3), Some(1), Some(2))).unwrap();
        let episode = film.into_episode().unwrap();
        assert_eq!(episode.key, EpisodeKey::new(3, 1, 2));
        assert_eq!(episode.content.title, "Pilot");
    }

    #[test]
    fn test_partial_discriminators_are_rejected() {
        let err = Film::try_from(row(Some(3), None, Some(2))).unwrap_err();
        assert!(matches!(err, RepoError::MalformedRow(_)));
    }

    #[test]
    fn test_patch_model_only_sets_submitted_fields() {
        let patch = FilmPatch {
            descriptions: Some(String::new()),
            ..Default::default()
        };
        let active = patch_model(patch, 4);
        assert!(active.title.is_not_set());
        assert!(active.duration.is_not_set());
        assert_eq!(active.descriptions, Set(Some(String::new())));
        assert_eq!(active.contributed_by, Set(4));
    }
}
