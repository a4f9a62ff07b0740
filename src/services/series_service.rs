//! Domain service for serieses.

use chrono::NaiveDate;
use serde::Deserialize;

use super::ServiceError;
use crate::db::Page;
use crate::models::{Paged, Series, SeriesPatch};

#[derive(Debug, Clone, Deserialize)]
pub struct SeriesCreateRequest {
    pub title: String,
    #[serde(default)]
    pub descriptions: Option<String>,
    pub date_started: NaiveDate,
    #[serde(default)]
    pub date_ended: Option<NaiveDate>,
}

/// Reason recorded when soft-deleting a series, movie or episode.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidationRequest {
    pub invalidation: String,
}

#[async_trait::async_trait]
pub trait SeriesService: Send + Sync {
    async fn get(&self, id: i32) -> Result<Series, ServiceError>;

    async fn get_all(&self, page: Page) -> Result<Paged<Series>, ServiceError>;

    /// Creates a series contributed by `user_id` and returns its id.
    async fn create(&self, request: SeriesCreateRequest, user_id: i32)
    -> Result<i32, ServiceError>;

    async fn update(&self, id: i32, patch: SeriesPatch, user_id: i32) -> Result<(), ServiceError>;

    /// Invalidates the series and every one of its episodes atomically.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] if the series does not exist. A series
    /// without episodes is not an error.
    async fn invalidate(
        &self,
        id: i32,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError>;

    /// Audit trail of series `id`, newest first.
    async fn audits_get_all(&self, id: i32, page: Page) -> Result<Paged<Series>, ServiceError>;

    async fn search(&self, query: &str, page: Page) -> Result<Paged<Series>, ServiceError>;
}
