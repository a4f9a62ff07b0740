use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use super::{Page, RepoError, RepoResult, Repository, expect_rows};
use crate::entities::{serieses, serieses_audit};
use crate::models::{Series, SeriesPatch};

impl From<serieses::Model> for Series {
    fn from(model: serieses::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            descriptions: model.descriptions,
            date_started: model.date_started,
            date_ended: model.date_ended,
            contributed_by: model.contributed_by,
            contributed_at: model.contributed_at,
            invalidation: model.invalidation,
        }
    }
}

impl From<serieses_audit::Model> for Series {
    fn from(model: serieses_audit::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            descriptions: model.descriptions,
            date_started: model.date_started,
            date_ended: model.date_ended,
            contributed_by: model.contributed_by,
            contributed_at: model.contributed_at,
            invalidation: model.invalidation,
        }
    }
}

impl<C: ConnectionTrait> Repository<C> {
    pub async fn series_get(&self, id: i32) -> RepoResult<Series> {
        serieses::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(Series::from)
            .ok_or(RepoError::NoRecord)
    }

    pub async fn serieses_get_all(&self, page: Page) -> RepoResult<Vec<Series>> {
        let rows = serieses::Entity::find()
            .order_by_asc(serieses::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Series::from).collect())
    }

    pub async fn serieses_count(&self) -> RepoResult<u64> {
        Ok(serieses::Entity::find().count(&self.conn).await?)
    }

    /// Stamps `contributor`, inserts, and writes the generated id back into `series`.
    pub async fn series_create(&self, series: &mut Series, contributor: i32) -> RepoResult<()> {
        series.contributed_by = contributor;
        series.contributed_at = Utc::now();

        let active = serieses::ActiveModel {
            id: NotSet,
            title: Set(series.title.clone()),
            descriptions: Set(series.descriptions.clone()),
            date_started: Set(series.date_started),
            date_ended: Set(series.date_ended),
            contributed_by: Set(series.contributed_by),
            contributed_at: Set(series.contributed_at),
            invalidation: Set(series.invalidation.clone()),
        };

        let result = serieses::Entity::insert(active).exec(&self.conn).await?;
        series.id = result.last_insert_id;
        Ok(())
    }

    pub async fn series_update(
        &self,
        id: i32,
        patch: SeriesPatch,
        contributor: i32,
    ) -> RepoResult<()> {
        let mut active = serieses::ActiveModel {
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
        if let Some(date_started) = patch.date_started {
            active.date_started = Set(date_started);
        }
        if let Some(date_ended) = patch.date_ended {
            active.date_ended = Set(Some(date_ended));
        }

        let result = serieses::Entity::update_many()
            .set(active)
            .filter(serieses::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        expect_rows(result.rows_affected).map(|_| ())
    }

    pub async fn series_invalidate(
        &self,
        id: i32,
        invalidation: String,
        contributor: i32,
    ) -> RepoResult<()> {
        let active = serieses::ActiveModel {
            invalidation: Set(Some(invalidation)),
            contributed_by: Set(contributor),
            contributed_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = serieses::Entity::update_many()
            .set(active)
            .filter(serieses::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        expect_rows(result.rows_affected).map(|_| ())
    }

    /// Snapshots of series `id`, newest first.
    pub async fn series_audits_get_all(&self, id: i32, page: Page) -> RepoResult<Vec<Series>> {
        let rows = serieses_audit::Entity::find()
            .filter(serieses_audit::Column::Id.eq(id))
            .order_by_desc(serieses_audit::Column::ContributedAt)
            .order_by_desc(serieses_audit::Column::AuditId)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Series::from).collect())
    }

    pub async fn series_audits_count(&self, id: i32) -> RepoResult<u64> {
        Ok(serieses_audit::Entity::find()
            .filter(serieses_audit::Column::Id.eq(id))
            .count(&self.conn)
            .await?)
    }
}
