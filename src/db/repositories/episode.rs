use chrono::Utc;
use sea_orm::{
    Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};

use super::film::{
    content_model, episode_audit_scope, episode_scope, into_episode, invalidation_model,
    patch_model, season_audit_scope, season_scope, series_audit_scope, series_scope,
};
use super::{Page, RepoError, RepoResult, Repository, expect_rows};
use crate::entities::{films, films_audit};
use crate::models::{Episode, EpisodeKey, FilmPatch};

impl<C: ConnectionTrait> Repository<C> {
    pub async fn episode_get(&self, key: EpisodeKey) -> RepoResult<Episode> {
        let row = films::Entity::find()
            .filter(episode_scope(key))
            .one(&self.conn)
            .await?
            .ok_or(RepoError::NoRecord)?;

        into_episode(row)
    }

    pub async fn episodes_get_all_by_series(
        &self,
        series_id: i32,
        page: Page,
    ) -> RepoResult<Vec<Episode>> {
        self.episodes_get_all(series_scope(series_id), page).await
    }

    pub async fn episodes_count_by_series(&self, series_id: i32) -> RepoResult<u64> {
        self.episodes_count(series_scope(series_id)).await
    }

    pub async fn episodes_get_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        page: Page,
    ) -> RepoResult<Vec<Episode>> {
        self.episodes_get_all(season_scope(series_id, season_number), page)
            .await
    }

    pub async fn episodes_count_by_season(
        &self,
        series_id: i32,
        season_number: i32,
    ) -> RepoResult<u64> {
        self.episodes_count(season_scope(series_id, season_number))
            .await
    }

    /// Inserts the episode or overwrites the one already stored under its key.
    ///
    /// Overwriting replaces every content column, re-stamps the contributor and
    /// clears any invalidation. The row id is written back into `episode`.
    pub async fn episode_put(&self, episode: &mut Episode, contributor: i32) -> RepoResult<()> {
        episode.contributed_by = contributor;
        episode.contributed_at = Utc::now();
        episode.invalidation = None;

        let mut active = content_model(&episode.content, contributor, episode.contributed_at);
        active.series_id = Set(Some(episode.key.series_id));
        active.season_number = Set(Some(episode.key.season_number));
        active.episode_number = Set(Some(episode.key.episode_number));

        films::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    films::Column::SeriesId,
                    films::Column::SeasonNumber,
                    films::Column::EpisodeNumber,
                ])
                .update_columns([
                    films::Column::Title,
                    films::Column::Descriptions,
                    films::Column::DateReleased,
                    films::Column::Duration,
                    films::Column::ContributedBy,
                    films::Column::ContributedAt,
                    films::Column::Invalidation,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        // last_insert_rowid is stale when the conflict branch ran, so read the id back.
        episode.id = self.episode_get(episode.key).await?.id;
        Ok(())
    }

    pub async fn episode_update(
        &self,
        key: EpisodeKey,
        patch: FilmPatch,
        contributor: i32,
    ) -> RepoResult<()> {
        let result = films::Entity::update_many()
            .set(patch_model(patch, contributor))
            .filter(episode_scope(key))
            .exec(&self.conn)
            .await?;

        expect_rows(result.rows_affected).map(|_| ())
    }

    pub async fn episode_invalidate(
        &self,
        key: EpisodeKey,
        invalidation: String,
        contributor: i32,
    ) -> RepoResult<()> {
        self.episodes_invalidate(episode_scope(key), invalidation, contributor)
            .await
            .map(|_| ())
    }

    /// Returns how many episodes were invalidated.
    pub async fn episodes_invalidate_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        invalidation: String,
        contributor: i32,
    ) -> RepoResult<u64> {
        self.episodes_invalidate(
            season_scope(series_id, season_number),
            invalidation,
            contributor,
        )
        .await
    }

    /// Returns how many episodes were invalidated.
    pub async fn episodes_invalidate_all_by_series(
        &self,
        series_id: i32,
        invalidation: String,
        contributor: i32,
    ) -> RepoResult<u64> {
        self.episodes_invalidate(series_scope(series_id), invalidation, contributor)
            .await
    }

    pub async fn episode_audits_get_all(
        &self,
        key: EpisodeKey,
        page: Page,
    ) -> RepoResult<Vec<Episode>> {
        self.episode_audits(episode_audit_scope(key), page).await
    }

    pub async fn episode_audits_count(&self, key: EpisodeKey) -> RepoResult<u64> {
        self.episode_audits_total(episode_audit_scope(key)).await
    }

    pub async fn episodes_audits_get_all_by_season(
        &self,
        series_id: i32,
        season_number: i32,
        page: Page,
    ) -> RepoResult<Vec<Episode>> {
        self.episode_audits(season_audit_scope(series_id, season_number), page)
            .await
    }

    pub async fn episodes_audits_count_by_season(
        &self,
        series_id: i32,
        season_number: i32,
    ) -> RepoResult<u64> {
        self.episode_audits_total(season_audit_scope(series_id, season_number))
            .await
    }

    pub async fn episodes_audits_get_all_by_series(
        &self,
        series_id: i32,
        page: Page,
    ) -> RepoResult<Vec<Episode>> {
        self.episode_audits(series_audit_scope(series_id), page)
            .await
    }

    pub async fn episodes_audits_count_by_series(&self, series_id: i32) -> RepoResult<u64> {
        self.episode_audits_total(series_audit_scope(series_id))
            .await
    }

    async fn episodes_get_all(&self, scope: Condition, page: Page) -> RepoResult<Vec<Episode>> {
        films::Entity::find()
            .filter(scope)
            .order_by_asc(films::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(into_episode)
            .collect()
    }

    async fn episodes_count(&self, scope: Condition) -> RepoResult<u64> {
        Ok(films::Entity::find()
            .filter(scope)
            .count(&self.conn)
            .await?)
    }

    async fn episodes_invalidate(
        &self,
        scope: Condition,
        invalidation: String,
        contributor: i32,
    ) -> RepoResult<u64> {
        let result = films::Entity::update_many()
            .set(invalidation_model(invalidation, contributor))
            .filter(scope)
            .exec(&self.conn)
            .await?;

        expect_rows(result.rows_affected)
    }

    async fn episode_audits(&self, scope: Condition, page: Page) -> RepoResult<Vec<Episode>> {
        films_audit::Entity::find()
            .filter(scope)
            .order_by_desc(films_audit::Column::ContributedAt)
            .order_by_desc(films_audit::Column::AuditId)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(into_episode)
            .collect()
    }

    async fn episode_audits_total(&self, scope: Condition) -> RepoResult<u64> {
        Ok(films_audit::Entity::find()
            .filter(scope)
            .count(&self.conn)
            .await?)
    }
}
