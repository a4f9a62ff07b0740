//! `SeaORM` implementation of the `MovieService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::db::{Page, Repository};
use crate::models::{FilmContent, FilmPatch, Movie, Paged};
use crate::services::movie_service::MovieService;
use crate::services::search::SearchService;
use crate::services::series_service::InvalidationRequest;
use crate::services::ServiceError;

pub struct SeaOrmMovieService {
    repo: Repository,
    search: Arc<dyn SearchService>,
}

impl SeaOrmMovieService {
    #[must_use]
    pub fn new(repo: Repository, search: Arc<dyn SearchService>) -> Self {
        Self { repo, search }
    }
}

#[async_trait]
impl MovieService for SeaOrmMovieService {
    async fn get(&self, id: i32) -> Result<Movie, ServiceError> {
        Ok(self.repo.movie_get(id).await?)
    }

    async fn get_all(&self, page: Page) -> Result<Paged<Movie>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Movie>, ServiceError>(move |tx| {
                Box::pin(async move {
                    let items = tx.movies_get_all(page).await?;
                    let total = tx.movies_count().await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn create(&self, content: FilmContent, user_id: i32) -> Result<i32, ServiceError> {
        let mut movie = Movie::new(content);
        self.repo.movie_create(&mut movie, user_id).await?;

        info!(movie_id = movie.id, user_id, "Movie created");
        Ok(movie.id)
    }

    async fn update(&self, id: i32, patch: FilmPatch, user_id: i32) -> Result<(), ServiceError> {
        Ok(self.repo.movie_update(id, patch, user_id).await?)
    }

    async fn invalidate(
        &self,
        id: i32,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        self.repo
            .movie_invalidate(id, request.invalidation, user_id)
            .await?;

        info!(movie_id = id, "Movie invalidated");
        Ok(())
    }

    async fn audits_get_all(&self, id: i32, page: Page) -> Result<Paged<Movie>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Movie>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.movie_get(id).await?;
                    let items = tx.movie_audits_get_all(id, page).await?;
                    let total = tx.movie_audits_count(id).await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn search(&self, query: &str, page: Page) -> Result<Paged<Movie>, ServiceError> {
        Ok(self.search.search_movies(query, page).await?)
    }
}
