use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::AuthUser;
use super::validation::{
    validate_email_update, validate_id, validate_password_update, validate_user_delete,
    validate_user_update,
};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::User;
use crate::services::{
    EmailUpdateRequest, PasswordUpdateRequest, UserDeleteRequest, UserUpdateRequest,
};

/// GET /v1/authorized/user/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let id = validate_id("user id", id)?;
    let user = state.users.get(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PATCH /v1/authorized/user
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(request): Json<UserUpdateRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_user_update(&request, &state.config.validation)?;

    state.users.update(user_id, request).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User updated",
    ))))
}

/// PUT /v1/authorized/user/email
pub async fn update_email(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(request): Json<EmailUpdateRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_email_update(&request, &state.config.validation)?;

    state.users.update_email(user_id, request).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Email updated",
    ))))
}

/// PUT /v1/authorized/user/password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(request): Json<PasswordUpdateRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_password_update(&request, &state.config.validation)?;

    state.users.update_password(user_id, request).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Password updated",
    ))))
}

/// DELETE /v1/authorized/user
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(request): Json<UserDeleteRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    validate_user_delete(&request)?;

    state.users.delete(user_id, request).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "User deleted",
    ))))
}
