//! Domain service for registration, authentication and account management.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::models::User;

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreateRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Profile fields a user may change. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub birthdate: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailUpdateRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordUpdateRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDeleteRequest {
    pub password: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Registers a user and returns the new id.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmailAlreadyUsed`] if the email is taken.
    async fn create(&self, request: UserCreateRequest) -> Result<i32, ServiceError>;

    /// Checks credentials and issues an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for an unknown email and
    /// [`ServiceError::IncorrectPassword`] for a wrong password.
    async fn login(&self, request: LoginRequest) -> Result<TokenPair, ServiceError>;

    /// Issues a fresh access token for a valid refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<String, ServiceError>;

    async fn get(&self, id: i32) -> Result<User, ServiceError>;

    async fn update(&self, id: i32, request: UserUpdateRequest) -> Result<(), ServiceError>;

    async fn update_email(&self, id: i32, request: EmailUpdateRequest)
    -> Result<(), ServiceError>;

    /// # Errors
    ///
    /// Returns [`ServiceError::SameNewPassword`] without touching storage when
    /// both passwords are equal.
    async fn update_password(
        &self,
        id: i32,
        request: PasswordUpdateRequest,
    ) -> Result<(), ServiceError>;

    /// Deletes the account after re-checking the password.
    async fn delete(&self, id: i32, request: UserDeleteRequest) -> Result<(), ServiceError>;
}
