//! Domain service for standalone movies.

use super::ServiceError;
use super::series_service::InvalidationRequest;
use crate::db::Page;
use crate::models::{FilmContent, FilmPatch, Movie, Paged};

#[async_trait::async_trait]
pub trait MovieService: Send + Sync {
    async fn get(&self, id: i32) -> Result<Movie, ServiceError>;

    async fn get_all(&self, page: Page) -> Result<Paged<Movie>, ServiceError>;

    /// Creates a movie contributed by `user_id` and returns its id.
    async fn create(&self, content: FilmContent, user_id: i32) -> Result<i32, ServiceError>;

    async fn update(&self, id: i32, patch: FilmPatch, user_id: i32) -> Result<(), ServiceError>;

    async fn invalidate(
        &self,
        id: i32,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError>;

    async fn audits_get_all(&self, id: i32, page: Page) -> Result<Paged<Movie>, ServiceError>;

    async fn search(&self, query: &str, page: Page) -> Result<Paged<Movie>, ServiceError>;
}
