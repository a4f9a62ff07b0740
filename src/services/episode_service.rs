//! Domain service for series episodes.
//!
//! Episodes are addressed by their [`EpisodeKey`]. Writes that create
//! episodes require the parent series to exist.

use super::ServiceError;
use super::series_service::InvalidationRequest;
use crate::db::Page;
use crate::models::{Episode, EpisodeKey, FilmContent, FilmPatch, Paged};

#[async_trait::async_trait]
pub trait EpisodeService: Send + Sync {
    async fn get(&self, key: EpisodeKey) -> Result<Episode, ServiceError>;

    async fn get_all_by_series(
        &self,
        series_id: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError>;

    async fn get_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError>;

    /// Creates the episode at `key` or overwrites it, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the series does not exist.
    async fn put(
        &self,
        key: EpisodeKey,
        content: FilmContent,
        user_id: i32,
    ) -> Result<i32, ServiceError>;

    /// Writes a whole season. The episodes are numbered 1..=N in list order;
    /// episodes numbered above N are left as they are.
    async fn put_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        episodes: Vec<FilmContent>,
        user_id: i32,
    ) -> Result<Vec<i32>, ServiceError>;

    async fn update(
        &self,
        key: EpisodeKey,
        patch: FilmPatch,
        user_id: i32,
    ) -> Result<(), ServiceError>;

    async fn invalidate(
        &self,
        key: EpisodeKey,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError>;

    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the season has no episodes.
    async fn invalidate_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError>;

    async fn audits_get_all(
        &self,
        key: EpisodeKey,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError>;

    async fn audits_get_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError>;

    async fn audits_get_all_by_series(
        &self,
        series_id: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError>;
}
