use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::observability::RequestSpan;
use super::validation::{validate_login, validate_user_create};
use super::{AccessTokenResponse, ApiError, ApiResponse, AppState, IdResponse};
use crate::services::token::extract_bearer;
use crate::services::{LoginRequest, ServiceError, TokenKind, TokenPair, UserCreateRequest};

/// Id of the user the access token was issued to. Inserted into both the
/// request and the response extensions by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i32);

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer)
        .ok_or(ApiError::TokenMissingOrMalformed)
}

/// Requires `Authorization: Bearer <access token>`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let payload = {
        let token = bearer_token(request.headers()).inspect_err(|_| {
            tracing::info!("Rejected request without a usable bearer token");
        })?;

        state
            .tokens
            .validate(token, TokenKind::Access)
            .map_err(|e| {
                tracing::info!(error = %e, "Rejected invalid access token");
                ApiError::TokenInvalid
            })?
    };

    if let Some(RequestSpan(span)) = request.extensions().get::<RequestSpan>() {
        span.record("user_id", payload.user_id);
    }

    let user = AuthUser(payload.user_id);
    request.extensions_mut().insert(user);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// POST /v1/user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UserCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_user_create(&request, &state.config.validation)?;

    let id = state.users.create(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(IdResponse { id })),
    ))
}

/// POST /v1/user/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, ApiError> {
    validate_login(&request, &state.config.validation)?;

    let tokens = state.users.login(request).await.map_err(|e| match e {
        ServiceError::NotFound => ApiError::EmailNotFound,
        other => other.into(),
    })?;

    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /v1/user/refresh
///
/// Takes the refresh token in the `Authorization` header.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, ApiError> {
    let refresh_token = bearer_token(&headers)?;

    let token = state.users.refresh_token(refresh_token).await?;

    Ok(Json(ApiResponse::success(AccessTokenResponse { token })))
}
