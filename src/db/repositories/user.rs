use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use super::{RepoError, RepoResult, Repository, expect_rows};
use crate::entities::users;
use crate::models::{User, UserPatch};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            hashed_password: model.hashed_password,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            birthdate: model.birthdate,
            joined_at: model.joined_at,
        }
    }
}

impl<C: ConnectionTrait> Repository<C> {
    pub async fn user_get(&self, id: i32) -> RepoResult<User> {
        users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(User::from)
            .ok_or(RepoError::NoRecord)
    }

    pub async fn user_get_by_email(&self, email: &str) -> RepoResult<User> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?
            .map(User::from)
            .ok_or(RepoError::NoRecord)
    }

    pub async fn users_count(&self) -> RepoResult<u64> {
        Ok(users::Entity::find().count(&self.conn).await?)
    }

    /// Inserts `user` and writes the generated id back into it.
    pub async fn user_create(&self, user: &mut User) -> RepoResult<()> {
        let active = users::ActiveModel {
            id: NotSet,
            email: Set(user.email.clone()),
            hashed_password: Set(user.hashed_password.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            bio: Set(user.bio.clone()),
            birthdate: Set(user.birthdate),
            joined_at: Set(user.joined_at),
        };

        let result = users::Entity::insert(active).exec(&self.conn).await?;
        user.id = result.last_insert_id;
        Ok(())
    }

    pub async fn user_update(&self, id: i32, patch: UserPatch) -> RepoResult<()> {
        // Nothing to write; still report a missing user.
        if patch.is_empty() {
            return self.user_get(id).await.map(|_| ());
        }

        let mut active = users::ActiveModel::default();
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(hashed_password) = patch.hashed_password {
            active.hashed_password = Set(hashed_password);
        }
        if let Some(first_name) = patch.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = patch.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(bio) = patch.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(birthdate) = patch.birthdate {
            active.birthdate = Set(Some(birthdate));
        }

        let result = users::Entity::update_many()
            .set(active)
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        expect_rows(result.rows_affected).map(|_| ())
    }

    pub async fn user_delete(&self, id: i32) -> RepoResult<()> {
        let result = users::Entity::delete_by_id(id).exec(&self.conn).await?;
        expect_rows(result.rows_affected).map(|_| ())
    }
}
