//! `SeaORM` implementation of the `EpisodeService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{Page, Repository};
use crate::models::{Episode, EpisodeKey, FilmContent, FilmPatch, Paged};
use crate::services::episode_service::EpisodeService;
use crate::services::series_service::InvalidationRequest;
use crate::services::ServiceError;

pub struct SeaOrmEpisodeService {
    repo: Repository,
}

impl SeaOrmEpisodeService {
    #[must_use]
    pub const fn new(repo: Repository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EpisodeService for SeaOrmEpisodeService {
    async fn get(&self, key: EpisodeKey) -> Result<Episode, ServiceError> {
        Ok(self.repo.episode_get(key).await?)
    }

    async fn get_all_by_series(
        &self,
        series_id: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Episode>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_get(series_id).await?;
                    let items = tx.episodes_get_all_by_series(series_id, page).await?;
                    let total = tx.episodes_count_by_series(series_id).await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn get_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Episode>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_get(series_id).await?;
                    let items = tx
                        .episodes_get_all_by_season(series_id, season_number, page)
                        .await?;
                    let total = tx
                        .episodes_count_by_season(series_id, season_number)
                        .await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn put(
        &self,
        key: EpisodeKey,
        content: FilmContent,
        user_id: i32,
    ) -> Result<i32, ServiceError> {
        let id = self
            .repo
            .transaction::<_, i32, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_get(key.series_id).await?;

                    let mut episode = Episode::new(key, content);
                    tx.episode_put(&mut episode, user_id).await?;
                    Ok(episode.id)
                })
            })
            .await?;

        info!(episode = %key, user_id, "Episode stored");
        Ok(id)
    }

    async fn put_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        episodes: Vec<FilmContent>,
        user_id: i32,
    ) -> Result<Vec<i32>, ServiceError> {
        let ids = self
            .repo
            .transaction::<_, Vec<i32>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_get(series_id).await?;

                    let mut ids = Vec::with_capacity(episodes.len());
                    for (number, content) in (1..).zip(episodes) {
                        let key = EpisodeKey::new(series_id, season_number, number);
                        let mut episode = Episode::new(key, content);
                        tx.episode_put(&mut episode, user_id).await?;
                        ids.push(episode.id);
                    }
                    Ok(ids)
                })
            })
            .await?;

        info!(
            series_id,
            season_number,
            count = ids.len(),
            "Season episodes stored"
        );
        Ok(ids)
    }

    async fn update(
        &self,
        key: EpisodeKey,
        patch: FilmPatch,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        Ok(self.repo.episode_update(key, patch, user_id).await?)
    }

    async fn invalidate(
        &self,
        key: EpisodeKey,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        self.repo
            .episode_invalidate(key, request.invalidation, user_id)
            .await?;

        info!(episode = %key, "Episode invalidated");
        Ok(())
    }

    async fn invalidate_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        request: InvalidationRequest,
        user_id: i32,
    ) -> Result<(), ServiceError> {
        let count = self
            .repo
            .episodes_invalidate_all_by_season(
                series_id,
                season_number,
                request.invalidation,
                user_id,
            )
            .await?;

        info!(series_id, season_number, count, "Season invalidated");
        Ok(())
    }

    async fn audits_get_all(
        &self,
        key: EpisodeKey,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Episode>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.episode_get(key).await?;
                    let items = tx.episode_audits_get_all(key, page).await?;
                    let total = tx.episode_audits_count(key).await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn audits_get_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Episode>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_get(series_id).await?;
                    let items = tx
                        .episodes_audits_get_all_by_season(series_id, season_number, page)
                        .await?;
                    let total = tx
                        .episodes_audits_count_by_season(series_id, season_number)
                        .await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }

    async fn audits_get_all_by_series(
        &self,
        series_id: i32,
        page: Page,
    ) -> Result<Paged<Episode>, ServiceError> {
        self.repo
            .transaction::<_, Paged<Episode>, ServiceError>(move |tx| {
                Box::pin(async move {
                    tx.series_get(series_id).await?;
                    let items = tx
                        .episodes_audits_get_all_by_series(series_id, page)
                        .await?;
                    let total = tx.episodes_audits_count_by_series(series_id).await?;
                    Ok(Paged::new(items, total))
                })
            })
            .await
    }
}
