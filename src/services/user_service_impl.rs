//! `SeaORM` implementation of the `UserService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::db::{RepoError, Repository};
use crate::models::{User, UserPatch};
use crate::services::hasher::Hasher;
use crate::services::token::{TokenKind, TokenPayload, TokenService};
use crate::services::user_service::{
    EmailUpdateRequest, LoginRequest, PasswordUpdateRequest, TokenPair, UserCreateRequest,
    UserDeleteRequest, UserService, UserUpdateRequest,
};
use crate::services::ServiceError;

pub struct SeaOrmUserService {
    repo: Repository,
    hasher: Arc<dyn Hasher>,
    tokens: Arc<dyn TokenService>,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(repo: Repository, hasher: Arc<dyn Hasher>, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            repo,
            hasher,
            tokens,
        }
    }
}

/// The unique index on `users.email` backs up the pre-check under concurrency.
fn email_conflict(err: RepoError) -> ServiceError {
    if err.is_unique_violation() {
        ServiceError::EmailAlreadyUsed
    } else {
        ServiceError::from(err)
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn create(&self, request: UserCreateRequest) -> Result<i32, ServiceError> {
        let hasher = Arc::clone(&self.hasher);

        let id = self
            .repo
            .transaction::<_, i32, ServiceError>(move |tx| {
                Box::pin(async move {
                    match tx.user_get_by_email(&request.email).await {
                        Ok(_) => return Err(ServiceError::EmailAlreadyUsed),
                        Err(RepoError::NoRecord) => {}
                        Err(e) => return Err(e.into()),
                    }

                    let digest = hasher.hash(&request.password).await?;

                    let mut user = User::new(request.email, digest);
                    user.first_name = request.first_name;
                    user.last_name = request.last_name;
                    user.bio = request.bio;
                    user.birthdate = request.birthdate;

                    tx.user_create(&mut user).await.map_err(email_conflict)?;
                    Ok(user.id)
                })
            })
            .await?;

        info!(user_id = id, "User registered");
        Ok(id)
    }

    async fn login(&self, request: LoginRequest) -> Result<TokenPair, ServiceError> {
        let user = self.repo.user_get_by_email(&request.email).await?;

        self.hasher
            .compare(&user.hashed_password, &request.password)
            .await?;

        let payload = TokenPayload { user_id: user.id };
        let token = self.tokens.issue_access(payload)?;
        let refresh_token = self.tokens.issue_refresh(payload)?;

        debug!(user_id = user.id, "User logged in");
        Ok(TokenPair {
            token,
            refresh_token,
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<String, ServiceError> {
        let payload = self.tokens.validate(refresh_token, TokenKind::Refresh)?;
        Ok(self.tokens.issue_access(payload)?)
    }

    async fn get(&self, id: i32) -> Result<User, ServiceError> {
        Ok(self.repo.user_get(id).await?)
    }

    async fn update(&self, id: i32, request: UserUpdateRequest) -> Result<(), ServiceError> {
        let patch = UserPatch {
            first_name: request.first_name,
            last_name: request.last_name,
            bio: request.bio,
            birthdate: request.birthdate,
            ..Default::default()
        };

        Ok(self.repo.user_update(id, patch).await?)
    }

    async fn update_email(
        &self,
        id: i32,
        request: EmailUpdateRequest,
    ) -> Result<(), ServiceError> {
        let patch = UserPatch {
            email: Some(request.email),
            ..Default::default()
        };

        self.repo
            .user_update(id, patch)
            .await
            .map_err(email_conflict)
    }

    async fn update_password(
        &self,
        id: i32,
        request: PasswordUpdateRequest,
    ) -> Result<(), ServiceError> {
        if request.current_password == request.new_password {
            return Err(ServiceError::SameNewPassword);
        }

        let hasher = Arc::clone(&self.hasher);

        self.repo
            .transaction::<_, (), ServiceError>(move |tx| {
                Box::pin(async move {
                    let user = tx.user_get(id).await?;
                    hasher
                        .compare(&user.hashed_password, &request.current_password)
                        .await?;

                    let digest = hasher.hash(&request.new_password).await?;
                    let patch = UserPatch {
                        hashed_password: Some(digest),
                        ..Default::default()
                    };
                    tx.user_update(id, patch).await?;
                    Ok(())
                })
            })
            .await?;

        info!(user_id = id, "Password changed");
        Ok(())
    }

    async fn delete(&self, id: i32, request: UserDeleteRequest) -> Result<(), ServiceError> {
        let hasher = Arc::clone(&self.hasher);

        self.repo
            .transaction::<_, (), ServiceError>(move |tx| {
                Box::pin(async move {
                    let user = tx.user_get(id).await?;
                    hasher
                        .compare(&user.hashed_password, &request.password)
                        .await?;
                    tx.user_delete(id).await?;
                    Ok(())
                })
            })
            .await?;

        info!(user_id = id, "User deleted");
        Ok(())
    }
}
