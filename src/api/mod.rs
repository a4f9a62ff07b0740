use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    middleware,
    routing::{get, patch, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    Argon2Hasher, DisabledSearch, ElasticSearch, EpisodeService, JwtTokenService, MovieService,
    SeaOrmEpisodeService, SeaOrmMovieService, SeaOrmSeriesService, SeaOrmUserService,
    SearchService, SeriesService, TokenService, UserService,
};

pub mod auth;
mod episodes;
mod error;
mod movies;
mod observability;
pub mod pagination;
mod series;
mod types;
mod users;
pub mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub users: Arc<dyn UserService>,

    pub serieses: Arc<dyn SeriesService>,

    pub movies: Arc<dyn MovieService>,

    pub episodes: Arc<dyn EpisodeService>,

    pub tokens: Arc<dyn TokenService>,

    pub prometheus_handle: Option<PrometheusHandle>,
}

/// Wires the services on top of an opened store.
pub async fn create_app_state(
    config: Config,
    store: Store,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let hasher = Arc::new(Argon2Hasher::new(&config.security)?);
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(&config.token));

    let search: Arc<dyn SearchService> = if config.search.enabled {
        let search = ElasticSearch::new(&config.search)?;
        search.ensure_indices().await?;
        info!(url = %config.search.url, "Search backend connected");
        Arc::new(search)
    } else {
        Arc::new(DisabledSearch)
    };

    let repo = store.repository();

    Ok(Arc::new(AppState {
        users: Arc::new(SeaOrmUserService::new(
            repo.clone(),
            hasher,
            tokens.clone(),
        )),
        serieses: Arc::new(SeaOrmSeriesService::new(repo.clone(), search.clone())),
        movies: Arc::new(SeaOrmMovieService::new(repo.clone(), search)),
        episodes: Arc::new(SeaOrmEpisodeService::new(repo)),
        tokens,
        store,
        config,
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    create_app_state(config, store, prometheus_handle).await
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;

    let cors_layer = if server.cors_allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = server
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    let timeout = Duration::from_secs(server.handler_timeout_seconds);

    let v1 = Router::new()
        .route("/user", post(auth::register))
        .route("/user/login", post(auth::login))
        .route("/user/refresh", post(auth::refresh))
        .nest("/authorized", create_protected_router(state.clone()));

    Router::new()
        .nest("/v1", v1)
        .route("/metrics", get(observability::get_metrics))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/user",
            patch(users::update_user).delete(users::delete_user),
        )
        .route("/user/{id}", get(users::get_user))
        .route("/user/email", put(users::update_email))
        .route("/user/password", put(users::update_password))
        .route("/movie", get(movies::list_movies).post(movies::create_movie))
        .route("/movie/search", get(movies::search_movies))
        .route(
            "/movie/{id}",
            get(movies::get_movie)
                .patch(movies::update_movie)
                .delete(movies::invalidate_movie),
        )
        .route("/movie/{id}/audits", get(movies::movie_audits))
        .route(
            "/series",
            get(series::list_serieses).post(series::create_series),
        )
        .route("/series/search", get(series::search_serieses))
        .route(
            "/series/{id}",
            get(series::get_series)
                .patch(series::update_series)
                .delete(series::invalidate_series),
        )
        .route("/series/{id}/audits", get(series::series_audits))
        .route("/series/{id}/episode", get(episodes::list_series_episodes))
        .route(
            "/series/{id}/episode/audits",
            get(episodes::series_episode_audits),
        )
        .route(
            "/series/{id}/season/{season}/episode",
            get(episodes::list_season_episodes)
                .put(episodes::put_season_episodes)
                .delete(episodes::invalidate_season),
        )
        .route(
            "/series/{id}/season/{season}/episode/audits",
            get(episodes::season_episode_audits),
        )
        .route(
            "/series/{id}/season/{season}/episode/{episode}",
            get(episodes::get_episode)
                .put(episodes::put_episode)
                .patch(episodes::update_episode)
                .delete(episodes::invalidate_episode),
        )
        .route(
            "/series/{id}/season/{season}/episode/{episode}/audits",
            get(episodes::episode_audits),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
