use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use std::collections::HashMap;
use std::sync::Arc;

use super::auth::AuthUser;
use super::pagination::{PageResponse, Pagination};
use super::validation::{
    validate_bulk_length, validate_episode_key, validate_film_content, validate_film_patch,
    validate_id, validate_invalidation, validate_season_number,
};
use super::{ApiError, ApiResponse, AppState, IdResponse, IdsResponse, MessageResponse};
use crate::models::{Episode, EpisodeKey, FilmContent, FilmPatch};
use crate::services::InvalidationRequest;

fn episode_key(
    state: &AppState,
    (series_id, season, episode): (i32, i32, i32),
) -> Result<EpisodeKey, ApiError> {
    validate_episode_key(
        EpisodeKey::new(series_id, season, episode),
        &state.config.validation,
    )
}

fn season(
    state: &AppState,
    (series_id, season_number): (i32, i32),
) -> Result<(i32, i32), ApiError> {
    Ok((
        validate_id("series id", series_id)?,
        validate_season_number(season_number, &state.config.validation)?,
    ))
}

/// GET /v1/authorized/series/{id}/episode
pub async fn list_series_episodes(
    State(state): State<Arc<AppState>>,
    Path(series_id): Path<i32>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Episode>>>, ApiError> {
    let series_id = validate_id("series id", series_id)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let episodes = state
        .episodes
        .get_all_by_series(series_id, pagination.window())
        .await?;

    Ok(Json(ApiResponse::success(pagination.respond(episodes))))
}

/// GET /v1/authorized/series/{id}/episode/audits
pub async fn series_episode_audits(
    State(state): State<Arc<AppState>>,
    Path(series_id): Path<i32>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Episode>>>, ApiError> {
    let series_id = validate_id("series id", series_id)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let audits = state
        .episodes
        .audits_get_all_by_series(series_id, pagination.window())
        .await?;

    Ok(Json(ApiResponse::success(pagination.respond(audits))))
}

/// GET /v1/authorized/series/{id}/season/{season}/episode
pub async fn list_season_episodes(
    State(state): State<Arc<AppState>>,
    Path(path): Path<(i32, i32)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Episode>>>, ApiError> {
    let (series_id, season_number) = season(&state, path)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let episodes = state
        .episodes
        .get_all_by_season(series_id, season_number, pagination.window())
        .await?;

    Ok(Json(ApiResponse::success(pagination.respond(episodes))))
}

/// PUT /v1/authorized/series/{id}/season/{season}/episode
///
/// Body is the ordered list of episodes; they are numbered from 1.
pub async fn put_season_episodes(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(path): Path<(i32, i32)>,
    Json(episodes): Json<Vec<FilmContent>>,
) -> Result<Json<ApiResponse<IdsResponse>>, ApiError> {
    let (series_id, season_number) = season(&state, path)?;
    validate_bulk_length(episodes.len(), &state.config.validation)?;
    for content in &episodes {
        validate_film_content(content, &state.config.validation)?;
    }

    let ids = state
        .episodes
        .put_all_by_season(series_id, season_number, episodes, user_id)
        .await?;

    Ok(Json(ApiResponse::success(IdsResponse { ids })))
}

/// DELETE /v1/authorized/series/{id}/season/{season}/episode
pub async fn invalidate_season(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(path): Path<(i32, i32)>,
    Json(request): Json<InvalidationRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let (series_id, season_number) = season(&state, path)?;
    validate_invalidation(&request, &state.config.validation)?;

    state
        .episodes
        .invalidate_all_by_season(series_id, season_number, request, user_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Season invalidated",
    ))))
}

/// GET /v1/authorized/series/{id}/season/{season}/episode/audits
pub async fn season_episode_audits(
    State(state): State<Arc<AppState>>,
    Path(path): Path<(i32, i32)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Episode>>>, ApiError> {
    let (series_id, season_number) = season(&state, path)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let audits = state
        .episodes
        .audits_get_all_by_season(series_id, season_number, pagination.window())
        .await?;

    Ok(Json(ApiResponse::success(pagination.respond(audits))))
}

/// GET /v1/authorized/series/{id}/season/{season}/episode/{episode}
pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path(path): Path<(i32, i32, i32)>,
) -> Result<Json<ApiResponse<Episode>>, ApiError> {
    let key = episode_key(&state, path)?;
    let episode = state.episodes.get(key).await?;
    Ok(Json(ApiResponse::success(episode)))
}

/// PUT /v1/authorized/series/{id}/season/{season}/episode/{episode}
pub async fn put_episode(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(path): Path<(i32, i32, i32)>,
    Json(content): Json<FilmContent>,
) -> Result<Json<ApiResponse<IdResponse>>, ApiError> {
    let key = episode_key(&state, path)?;
    validate_film_content(&content, &state.config.validation)?;

    let id = state.episodes.put(key, content, user_id).await?;

    Ok(Json(ApiResponse::success(IdResponse { id })))
}

/// PATCH /v1/authorized/series/{id}/season/{season}/episode/{episode}
pub async fn update_episode(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(path): Path<(i32, i32, i32)>,
    Json(patch): Json<FilmPatch>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let key = episode_key(&state, path)?;
    validate_film_patch(&patch, &state.config.validation)?;

    state.episodes.update(key, patch, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Episode updated",
    ))))
}

/// DELETE /v1/authorized/series/{id}/season/{season}/episode/{episode}
pub async fn invalidate_episode(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(path): Path<(i32, i32, i32)>,
    Json(request): Json<InvalidationRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let key = episode_key(&state, path)?;
    validate_invalidation(&request, &state.config.validation)?;

    state.episodes.invalidate(key, request, user_id).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Episode invalidated",
    ))))
}

/// GET /v1/authorized/series/{id}/season/{season}/episode/{episode}/audits
pub async fn episode_audits(
    State(state): State<Arc<AppState>>,
    Path(path): Path<(i32, i32, i32)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<PageResponse<Episode>>>, ApiError> {
    let key = episode_key(&state, path)?;
    let pagination = Pagination::from_query(&state.config.pagination, &params)?;

    let audits = state
        .episodes
        .audits_get_all(key, pagination.window())
        .await?;

    Ok(Json(ApiResponse::success(pagination.respond(audits))))
}
