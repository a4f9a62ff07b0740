use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::auth::AuthUser;
use super::pagination::{PageResponse, Pagination};
use super::validation::{
    validate_id, validate_invalidation, validate_search_query, validate_series_create,
    validate_series_patch,
};
use super::{ApiError, ApiResponse, AppState, IdResponse, MessageResponse};
use crate::models::{Series, SeriesPatch};
use crate::services::{InvalidationRequest, SeriesCreateRequest};

/// GET /v1/authorized/series
pub async fn list_serieses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Series>>>, ApiError> {
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let serieses = state.serieses.get_all(pagination.window()).await?;

    Ok(Json(ApiResponse::success(pagination.respond(serieses))))
}

/// POST /v1/authorized/series
pub async fn create_series(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(request): Json<SeriesCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_series_create(&request, &state.config.validation)?;

    let id = state.serieses.create(request, user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(IdResponse { id })),
    ))
}

/// GET /v1/authorized/series/search?query=
pub async fn search_serieses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Series>>>, ApiError> {
    let query = params.get("query").map_or("", String::as_str);
    let query = validate_search_query(query, &state.config.validation)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let serieses = state.serieses.search(query, pagination.window()).await?;

    Ok(Json(ApiResponse::success(pagination.respond(serieses))))
}

/// GET /v1/authorized/series/{id}
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Series>>, ApiError> {
    let id = validate_id("series id", id)?;
    let series = state.serieses.get(id).await?;
    Ok(Json(ApiResponse::success(series)))
}

/// PATCH /v1/authorized/series/{id}
pub async fn update_series(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(patch): Json<SeriesPatch>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("series id", id)?;
    validate_series_patch(&patch, &state.config.validation)?;

    state.serieses.update(id, patch, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Series updated",
    ))))
}

/// DELETE /v1/authorized/series/{id}
///
/// Invalidates the series together with all of its episodes.
pub async fn invalidate_series(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(request): Json<InvalidationRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("series id", id)?;
    validate_invalidation(&request, &state.config.validation)?;

    state.serieses.invalidate(id, request, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Series invalidated",
    ))))
}

/// GET /v1/authorized/series/{id}/audits
pub async fn series_audits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Series>>>, ApiError> {
    let id = validate_id("series id", id)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let audits = state
        .serieses
        .audits_get_all(id, pagination.window())
        .await?;

    Ok(Json(ApiResponse::success(pagination.respond(audits))))
}
