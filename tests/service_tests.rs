//! Service orchestration: error translation, atomicity and collaborator
//! failures.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;
use watch_server::config::{SecurityConfig, TokenConfig};
use watch_server::db::{Page, Repository, Store};
use watch_server::models::{EpisodeKey, FilmContent};
use watch_server::services::{
    Argon2Hasher, DisabledSearch, EpisodeService, HashError, Hasher, InvalidationRequest,
    JwtTokenService, LoginRequest, MovieService, PasswordUpdateRequest, SeaOrmEpisodeService,
    SeaOrmMovieService, SeaOrmSeriesService, SeaOrmUserService, SeriesCreateRequest,
    SeriesService, ServiceError, TokenError, TokenKind, TokenPayload, TokenService,
    UserCreateRequest, UserService,
};

fn cheap_hasher() -> Arc<dyn Hasher> {
    Arc::new(
        Argon2Hasher::new(&SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        })
        .unwrap(),
    )
}

fn token_service() -> Arc<JwtTokenService> {
    Arc::new(JwtTokenService::new(&TokenConfig {
        secret_key: "0123456789abcdef0123456789abcdef".to_string(),
        access_duration_minutes: 15,
        refresh_duration_minutes: 60,
    }))
}

async fn spawn_repo() -> Repository {
    let db_path = std::env::temp_dir().join(format!(
        "watch-server-service-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open store")
        .repository()
}

fn user_service(repo: Repository) -> SeaOrmUserService {
    SeaOrmUserService::new(repo, cheap_hasher(), token_service())
}

fn registration(email: &str) -> UserCreateRequest {
    UserCreateRequest {
        email: email.to_string(),
        password: "Secr3t!pass".to_string(),
        first_name: Some("Jane".to_string()),
        last_name: None,
        bio: None,
        birthdate: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_series(repo: &Repository, user_id: i32) -> i32 {
    let serieses = SeaOrmSeriesService::new(repo.clone(), Arc::new(DisabledSearch));
    serieses
        .create(
            SeriesCreateRequest {
                title: "Dark".to_string(),
                descriptions: None,
                date_started: date(2017, 12, 1),
                date_ended: None,
            },
            user_id,
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let repo = spawn_repo().await;
    let users = user_service(repo.clone());

    users.create(registration("jane@example.com")).await.unwrap();
    let err = users
        .create(registration("jane@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::EmailAlreadyUsed));
    assert_eq!(repo.users_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_login_and_refresh() {
    let repo = spawn_repo().await;
    let tokens = token_service();
    let users = SeaOrmUserService::new(repo, cheap_hasher(), tokens.clone());

    let id = users.create(registration("jane@example.com")).await.unwrap();

    let pair = users
        .login(LoginRequest {
            email: "jane@example.com".to_string(),
            password: "Secr3t!pass".to_string(),
        })
        .await
        .unwrap();

    let access = tokens.validate(&pair.token, TokenKind::Access).unwrap();
    assert_eq!(access.user_id, id);

    let refreshed = users.refresh_token(&pair.refresh_token).await.unwrap();
    assert_eq!(
        tokens.validate(&refreshed, TokenKind::Access).unwrap().user_id,
        id
    );

    assert!(matches!(
        users.refresh_token(&pair.token).await,
        Err(ServiceError::TokenInvalid)
    ));
}

#[tokio::test]
async fn test_login_errors() {
    let users = user_service(spawn_repo().await);
    users.create(registration("jane@example.com")).await.unwrap();

    let missing = users
        .login(LoginRequest {
            email: "john@example.com".to_string(),
            password: "Secr3t!pass".to_string(),
        })
        .await;
    assert!(matches!(missing, Err(ServiceError::NotFound)));

    let wrong = users
        .login(LoginRequest {
            email: "jane@example.com".to_string(),
            password: "Wr0ng!pass".to_string(),
        })
        .await;
    assert!(matches!(wrong, Err(ServiceError::IncorrectPassword)));
}

#[tokio::test]
async fn test_same_new_password_is_rejected_without_storage() {
    // Any query against a disconnected pool fails, so reaching storage would
    // surface as a database error instead.
    let users = user_service(Repository::new(DatabaseConnection::Disconnected));

    let err = users
        .update_password(
            1,
            PasswordUpdateRequest {
                current_password: "Secr3t!pass".to_string(),
                new_password: "Secr3t!pass".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::SameNewPassword));
}

#[tokio::test]
async fn test_password_update_requires_current_password() {
    let users = user_service(spawn_repo().await);
    let id = users.create(registration("jane@example.com")).await.unwrap();

    let err = users
        .update_password(
            id,
            PasswordUpdateRequest {
                current_password: "Wr0ng!pass".to_string(),
                new_password: "N3w!password".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::IncorrectPassword));

    users
        .update_password(
            id,
            PasswordUpdateRequest {
                current_password: "Secr3t!pass".to_string(),
                new_password: "N3w!password".to_string(),
            },
        )
        .await
        .unwrap();

    let pair = users
        .login(LoginRequest {
            email: "jane@example.com".to_string(),
            password: "N3w!password".to_string(),
        })
        .await;
    assert!(pair.is_ok());
}

struct FailingHasher;

#[async_trait]
impl Hasher for FailingHasher {
    async fn hash(&self, _password: &str) -> Result<String, HashError> {
        Err(HashError::Failed("forced".to_string()))
    }

    async fn compare(&self, _digest: &str, _password: &str) -> Result<(), HashError> {
        Err(HashError::Failed("forced".to_string()))
    }
}

#[tokio::test]
async fn test_failed_registration_leaves_no_user() {
    let repo = spawn_repo().await;
    let users = SeaOrmUserService::new(repo.clone(), Arc::new(FailingHasher), token_service());

    let err = users
        .create(registration("jane@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Hash(_)));
    assert_eq!(repo.users_count().await.unwrap(), 0);
}

/// Issues access tokens but fails to sign refresh tokens.
struct BrokenRefreshTokens(Arc<JwtTokenService>);

impl TokenService for BrokenRefreshTokens {
    fn issue_access(&self, payload: TokenPayload) -> Result<String, TokenError> {
        self.0.issue_access(payload)
    }

    fn issue_refresh(&self, _payload: TokenPayload) -> Result<String, TokenError> {
        Err(TokenError::Signing("forced".to_string()))
    }

    fn validate(&self, token: &str, kind: TokenKind) -> Result<TokenPayload, TokenError> {
        self.0.validate(token, kind)
    }
}

#[tokio::test]
async fn test_login_fails_when_any_token_fails() {
    let repo = spawn_repo().await;
    let users = SeaOrmUserService::new(
        repo,
        cheap_hasher(),
        Arc::new(BrokenRefreshTokens(token_service())),
    );
    users.create(registration("jane@example.com")).await.unwrap();

    let result = users
        .login(LoginRequest {
            email: "jane@example.com".to_string(),
            password: "Secr3t!pass".to_string(),
        })
        .await;

    assert!(matches!(result, Err(ServiceError::Token(_))));
}

/// Installs a trigger that aborts any statement matching `condition`.
async fn abort_when(repo: &Repository, name: &str, event: &str, condition: &str) {
    repo.connection()
        .execute_unprepared(&format!(
            "CREATE TRIGGER {name} BEFORE {event} ON films WHEN {condition} \
             BEGIN SELECT RAISE(ABORT, 'forced failure'); END"
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_series_without_episodes_can_be_invalidated() {
    let repo = spawn_repo().await;
    let user_id = user_service(repo.clone())
        .create(registration("jane@example.com"))
        .await
        .unwrap();
    let series_id = seed_series(&repo, user_id).await;

    let serieses = SeaOrmSeriesService::new(repo, Arc::new(DisabledSearch));
    serieses
        .invalidate(
            series_id,
            InvalidationRequest {
                invalidation: "copyright".to_string(),
            },
            user_id,
        )
        .await
        .unwrap();

    let series = serieses.get(series_id).await.unwrap();
    assert_eq!(series.invalidation.as_deref(), Some("copyright"));
}

#[tokio::test]
async fn test_series_invalidation_cascades_to_episodes() {
    let repo = spawn_repo().await;
    let user_id = user_service(repo.clone())
        .create(registration("jane@example.com"))
        .await
        .unwrap();
    let series_id = seed_series(&repo, user_id).await;

    let episodes = SeaOrmEpisodeService::new(repo.clone());
    episodes
        .put_all_by_season(
            series_id,
            1,
            vec![
                FilmContent::new("Secrets", date(2017, 12, 1)),
                FilmContent::new("Lies", date(2017, 12, 1)),
            ],
            user_id,
        )
        .await
        .unwrap();

    SeaOrmSeriesService::new(repo, Arc::new(DisabledSearch))
        .invalidate(
            series_id,
            InvalidationRequest {
                invalidation: "copyright".to_string(),
            },
            user_id,
        )
        .await
        .unwrap();

    let stored = episodes
        .get_all_by_series(series_id, Page::new(0, 10))
        .await
        .unwrap();
    assert_eq!(stored.total, 2);
    assert!(
        stored
            .items
            .iter()
            .all(|e| e.invalidation.as_deref() == Some("copyright"))
    );
}

#[tokio::test]
async fn test_missing_series_invalidation_is_not_found() {
    let serieses = SeaOrmSeriesService::new(spawn_repo().await, Arc::new(DisabledSearch));

    let err = serieses
        .invalidate(
            7,
            InvalidationRequest {
                invalidation: "copyright".to_string(),
            },
            1,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound));
}

#[tokio::test]
async fn test_season_episodes_are_numbered_in_order() {
    let repo = spawn_repo().await;
    let user_id = user_service(repo.clone())
        .create(registration("jane@example.com"))
        .await
        .unwrap();
    let series_id = seed_series(&repo, user_id).await;
    let episodes = SeaOrmEpisodeService::new(repo);

    let existing = episodes
        .put_all_by_season(
            series_id,
            2,
            (1..=5)
                .map(|n| FilmContent::new(format!("Old {n}"), date(2019, 6, 21)))
                .collect(),
            user_id,
        )
        .await
        .unwrap();
    assert_eq!(existing.len(), 5);

    let titles = ["Secrets", "Lies", "Past and Present"];
    let ids = episodes
        .put_all_by_season(
            series_id,
            2,
            titles
                .iter()
                .map(|t| FilmContent::new(*t, date(2019, 6, 21)))
                .collect(),
            user_id,
        )
        .await
        .unwrap();
    assert_eq!(ids, existing[..3]);

    for (number, title) in (1..).zip(titles) {
        let episode = episodes
            .get(EpisodeKey::new(series_id, 2, number))
            .await
            .unwrap();
        assert_eq!(episode.content.title, title);
        assert_eq!(episode.id, ids[usize::try_from(number - 1).unwrap()]);
    }

    for number in 4..=5 {
        let episode = episodes
            .get(EpisodeKey::new(series_id, 2, number))
            .await
            .unwrap();
        assert_eq!(episode.content.title, format!("Old {number}"));
    }

    let season = episodes
        .get_all_by_season(series_id, 2, Page::new(0, 10))
        .await
        .unwrap();
    assert_eq!(season.total, 5);
}

#[tokio::test]
async fn test_failed_season_put_writes_no_episode() {
    let repo = spawn_repo().await;
    let user_id = user_service(repo.clone())
        .create(registration("jane@example.com"))
        .await
        .unwrap();
    let series_id = seed_series(&repo, user_id).await;
    abort_when(&repo, "reject_lies", "INSERT", "NEW.title = 'Lies'").await;
    let episodes = SeaOrmEpisodeService::new(repo);

    let err = episodes
        .put_all_by_season(
            series_id,
            1,
            vec![
                FilmContent::new("Secrets", date(2017, 12, 1)),
                FilmContent::new("Lies", date(2017, 12, 1)),
                FilmContent::new("Past and Present", date(2017, 12, 1)),
            ],
            user_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Database(_)));

    let first = episodes.get(EpisodeKey::new(series_id, 1, 1)).await;
    assert!(matches!(first, Err(ServiceError::NotFound)));

    let season = episodes
        .get_all_by_season(series_id, 1, Page::new(0, 10))
        .await
        .unwrap();
    assert_eq!(season.total, 0);
}

#[tokio::test]
async fn test_failed_cascade_keeps_series_valid() {
    let repo = spawn_repo().await;
    let user_id = user_service(repo.clone())
        .create(registration("jane@example.com"))
        .await
        .unwrap();
    let series_id = seed_series(&repo, user_id).await;

    let episodes = SeaOrmEpisodeService::new(repo.clone());
    episodes
        .put_all_by_season(
            series_id,
            1,
            vec![
                FilmContent::new("Secrets", date(2017, 12, 1)),
                FilmContent::new("Lies", date(2017, 12, 1)),
            ],
            user_id,
        )
        .await
        .unwrap();
    abort_when(
        &repo,
        "reject_episode_invalidation",
        "UPDATE",
        "NEW.series_id IS NOT NULL AND NEW.invalidation IS NOT NULL",
    )
    .await;

    let serieses = SeaOrmSeriesService::new(repo, Arc::new(DisabledSearch));
    let err = serieses
        .invalidate(
            series_id,
            InvalidationRequest {
                invalidation: "copyright".to_string(),
            },
            user_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Database(_)));

    let series = serieses.get(series_id).await.unwrap();
    assert_eq!(series.invalidation, None);

    let audits = serieses
        .audits_get_all(series_id, Page::new(0, 10))
        .await
        .unwrap();
    assert_eq!(audits.total, 1);

    let stored = episodes
        .get_all_by_series(series_id, Page::new(0, 10))
        .await
        .unwrap();
    assert!(stored.items.iter().all(|e| e.invalidation.is_none()));
}

#[tokio::test]
async fn test_episodes_require_an_existing_series() {
    let episodes = SeaOrmEpisodeService::new(spawn_repo().await);

    let put = episodes
        .put(
            EpisodeKey::new(11, 1, 1),
            FilmContent::new("Orphan", date(2020, 1, 1)),
            1,
        )
        .await;
    assert!(matches!(put, Err(ServiceError::NotFound)));

    let audits = episodes.audits_get_all_by_series(11, Page::new(0, 10)).await;
    assert!(matches!(audits, Err(ServiceError::NotFound)));
}

#[tokio::test]
async fn test_movie_audits_track_every_change() {
    let repo = spawn_repo().await;
    let user_id = user_service(repo.clone())
        .create(registration("jane@example.com"))
        .await
        .unwrap();
    let movies = SeaOrmMovieService::new(repo, Arc::new(DisabledSearch));

    let id = movies
        .create(FilmContent::new("Heat", date(1995, 12, 15)), user_id)
        .await
        .unwrap();
    movies
        .invalidate(
            id,
            InvalidationRequest {
                invalidation: "duplicate".to_string(),
            },
            user_id,
        )
        .await
        .unwrap();

    let audits = movies.audits_get_all(id, Page::new(0, 10)).await.unwrap();
    assert_eq!(audits.total, 2);
    assert_eq!(audits.items[0].invalidation.as_deref(), Some("duplicate"));
    assert_eq!(audits.items[1].invalidation, None);
}

#[tokio::test]
async fn test_search_reports_disabled_backend() {
    let movies = SeaOrmMovieService::new(spawn_repo().await, Arc::new(DisabledSearch));

    let result = movies.search("heat", Page::new(0, 10)).await;
    assert!(matches!(result, Err(ServiceError::SearchDisabled)));
}
