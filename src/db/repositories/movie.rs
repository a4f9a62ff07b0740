use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::film::{
    content_model, into_movie, invalidation_model, movie_audit_scope, movie_scope, patch_model,
};
use super::{Page, RepoError, RepoResult, Repository, expect_rows};
use crate::entities::{films, films_audit};
use crate::models::{FilmPatch, Movie};

impl<C: ConnectionTrait> Repository<C> {
    pub async fn movie_get(&self, id: i32) -> RepoResult<Movie> {
        let row = films::Entity::find_by_id(id)
            .filter(movie_scope())
            .one(&self.conn)
            .await?
            .ok_or(RepoError::NoRecord)?;

        into_movie(row)
    }

    pub async fn movies_get_all(&self, page: Page) -> RepoResult<Vec<Movie>> {
        films::Entity::find()
            .filter(movie_scope())
            .order_by_asc(films::Column::Id)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(into_movie)
            .collect()
    }

    pub async fn movies_count(&self) -> RepoResult<u64> {
        Ok(films::Entity::find()
            .filter(movie_scope())
            .count(&self.conn)
            .await?)
    }

    /// Stamps `contributor`, inserts, and writes the generated id back into `movie`.
    pub async fn movie_create(&self, movie: &mut Movie, contributor: i32) -> RepoResult<()> {
        movie.contributed_by = contributor;
        movie.contributed_at = Utc::now();
        movie.invalidation = None;

        let active = content_model(&movie.content, contributor, movie.contributed_at);
        let result = films::Entity::insert(active).exec(&self.conn).await?;
        movie.id = result.last_insert_id;
        Ok(())
    }

    pub async fn movie_update(&self, id: i32, patch: FilmPatch, contributor: i32) -> RepoResult<()> {
        let result = films::Entity::update_many()
            .set(patch_model(patch, contributor))
            .filter(films::Column::Id.eq(id))
            .filter(movie_scope())
            .exec(&self.conn)
            .await?;

        expect_rows(result.rows_affected).map(|_| ())
    }

    pub async fn movie_invalidate(
        &self,
        id: i32,
        invalidation: String,
        contributor: i32,
    ) -> RepoResult<()> {
        let result = films::Entity::update_many()
            .set(invalidation_model(invalidation, contributor))
            .filter(films::Column::Id.eq(id))
            .filter(movie_scope())
            .exec(&self.conn)
            .await?;

        expect_rows(result.rows_affected).map(|_| ())
    }

    /// Snapshots of movie `id`, newest first.
    pub async fn movie_audits_get_all(&self, id: i32, page: Page) -> RepoResult<Vec<Movie>> {
        films_audit::Entity::find()
            .filter(films_audit::Column::Id.eq(id))
            .filter(movie_audit_scope())
            .order_by_desc(films_audit::Column::ContributedAt)
            .order_by_desc(films_audit::Column::AuditId)
            .offset(page.offset)
            .limit(page.limit)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(into_movie)
            .collect()
    }

    pub async fn movie_audits_count(&self, id: i32) -> RepoResult<u64> {
        Ok(films_audit::Entity::find()
            .filter(films_audit::Column::Id.eq(id))
            .filter(movie_audit_scope())
            .count(&self.conn)
            .await?)
    }
}
