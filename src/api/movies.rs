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
    validate_film_content, validate_film_patch, validate_id, validate_invalidation,
    validate_search_query,
};
use super::{ApiError, ApiResponse, AppState, IdResponse, MessageResponse};
use crate::models::{FilmContent, FilmPatch, Movie};
use crate::services::InvalidationRequest;

/// GET /v1/authorized/movie
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Movie>>>, ApiError> {
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let movies = state.movies.get_all(pagination.window()).await?;

    Ok(Json(ApiResponse::success(pagination.respond(movies))))
}

/// POST /v1/authorized/movie
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(content): Json<FilmContent>,
) -> Result<impl IntoResponse, ApiError> {
    validate_film_content(&content, &state.config.validation)?;

    let id = state.movies.create(content, user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(IdResponse { id })),
    ))
}

/// GET /v1/authorized/movie/search?query=
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Movie>>>, ApiError> {
    let query = params.get("query").map_or("", String::as_str);
    let query = validate_search_query(query, &state.config.validation)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let movies = state.movies.search(query, pagination.window()).await?;

    Ok(Json(ApiResponse::success(pagination.respond(movies))))
}

/// GET /v1/authorized/movie/{id}
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Movie>>, ApiError> {
    let id = validate_id("movie id", id)?;
    let movie = state.movies.get(id).await?;
    Ok(Json(ApiResponse::success(movie)))
}

/// PATCH /v1/authorized/movie/{id}
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(patch): Json<FilmPatch>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("movie id", id)?;
    validate_film_patch(&patch, &state.config.validation)?;

    state.movies.update(id, patch, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Movie updated",
    ))))
}

/// DELETE /v1/authorized/movie/{id}
pub async fn invalidate_movie(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(request): Json<InvalidationRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("movie id", id)?;
    validate_invalidation(&request, &state.config.validation)?;

    state.movies.invalidate(id, request, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Movie invalidated",
    ))))
}

/// GET /v1/authorized/movie/{id}/audits
pub async fn movie_audits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Movie>>>, ApiError> {
    let id = validate_id("movie id", id)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let audits = state.movies.audits_get_all(id, pagination.window()).await?;

    Ok(Json(ApiResponse::success(pagination.respond(audits))))
}
