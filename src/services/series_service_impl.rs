//! `SeaORM` implementation of the `SeriesService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{Page, RepoError, Repository};
use crate::models::{Paged, Series, SeriesPatch};
use crate::services::search::SearchService;
use crate::services::series_service::{InvalidationRequest, SeriesCreateRequest, SeriesService};
use crate::services::ServiceError;

pub struct SeaOrmSeriesService {
    repo: Repository,
    search: Arc<dyn SearchService>,
}

impl SeaOrmSeriesService {
    #[must_use]
    pub fn new(repo: Repository, search: Arc<dyn SearchService>) -> Self {
        Self { repo, search }
    }
}

#[async_trait]
impl SeriesService for SeaOrmSeriesService {
    async fn get(&self, id: i32) -> Result<Series, ServiceError> {
        Ok(self.repo.series_get(id).await?)
    }

    async fn get_all(&self, page: Page) -> Result<Paged<Series>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Series>, ServiceError>(move |tx| {
                Box::pin(async move {
                    let items = tx.serieses_get_all(page).await?;
                    let total = tx.serieses_count().await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn create(
        &self,
        request: SeriesCreateRequest,
        user_id: i32,
    ) -> Result<i32, ServiceError> {
        let mut series = Series::new(request.title, request.date_started);
        series.descriptions = request.descriptions;
        series.date_ended = request.date_ended;

        self.repo.series_create(&mut series, user_id).await?;

        info!(series_id = series.id, user_id, "Series created");
        Ok(series.id)
    }

    async fn update(&self, id: i32, patch: SeriesPatch, user_id: i32) -> Result<(), ServiceError> {
        Ok(self.repo.series_update(id, patch, user_id).await?)
    }

    async fn invalidate(
        &self,
        id: i32,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        let episodes = self
            .repo
            .transaction::<_, u64, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_invalidate(id, request.invalidation.clone(), user_id)
                        .await?;

                    match tx
                        .episodes_invalidate_all_by_series(id, request.invalidation, user_id)
                        .await
                    {
                        Ok(count) => Ok(count),
                        Err(RepoError::NoRecord) => Ok(0),
                        Err(e) => Err(e.into()),
                    }
                })
            })
            .await?;

        info!(series_id = id, episodes, "Series invalidated");
        Ok(())
    }

    async fn audits_get_all(&self, id: i32, page: Page) -> Result<Paged<Series>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Series>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_get(id).await?;
                    let items = tx.series_audits_get_all(id, page).await?;
                    let total = tx.series_audits_count(id).await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn search(&self, query: &str, page: Page) -> Result<Paged<Series>, ServiceError> {
        debug!(query, "Searching serieses");
        Ok(self.search.search_serieses(query, page).await?)
    }
}
