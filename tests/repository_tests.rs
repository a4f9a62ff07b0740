//! Storage behaviour: transactions, not-found mapping, patches, audits and
//! cascades against a fresh sqlite file per test.

use chrono::NaiveDate;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use watch_server::db::{Page, RepoError, Repository, Store};
use watch_server::models::{
    Episode, EpisodeKey, FilmContent, FilmPatch, Movie, Series, SeriesPatch, User,
};

async fn spawn_store() -> Store {
    let db_path = std::env::temp_dir().join(format!(
        "watch-server-repo-test-{}.db",
        uuid::Uuid::new_v4()
    ));

    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open store")
}

async fn seed_user(repo: &Repository, email: &str) -> i32 {
    let mut user = User::new(email, "digest");
    repo.user_create(&mut user).await.expect("create user");
    user.id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_series(repo: &Repository, contributor: i32) -> i32 {
    let mut series = Series::new("Dark", date(2017, 12, 1));
    repo.series_create(&mut series, contributor)
        .await
        .expect("create series");
    series.id
}

async fn seed_episode(repo: &Repository, key: EpisodeKey, title: &str, contributor: i32) -> i32 {
    let mut episode = Episode::new(key, FilmContent::new(title, date(2017, 12, 1)));
    repo.episode_put(&mut episode, contributor)
        .await
        .expect("put episode");
    episode.id
}

#[tokio::test]
async fn test_transaction_commits_on_ok() {
    let repo = spawn_store().await.repository();

    let id = repo
        .transaction::<_, i32, RepoError>(|tx| {
            Box::pin(async move {
                let mut user = User::new("commit@example.com", "digest");
                tx.user_create(&mut user).await?;
                Ok(user.id)
            })
        })
        .await
        .expect("transaction");

    assert_eq!(repo.users_count().await.unwrap(), 1);
    assert_eq!(repo.user_get(id).await.unwrap().email, "commit@example.com");
}

#[tokio::test]
async fn test_transaction_rolls_back_on_err() {
    let repo = spawn_store().await.repository();

    let result = repo
        .transaction::<_, (), RepoError>(|tx| {
            Box::pin(async move {
                let mut user = User::new("rollback@example.com", "digest");
                tx.user_create(&mut user).await?;
                tx.series_get(4242).await?;
                Ok(())
            })
        })
        .await;

    assert!(matches!(result, Err(RepoError::NoRecord)));
    assert_eq!(repo.users_count().await.unwrap(), 0);
}

#[tokio::test]
#[allow(unreachable_code)]
async fn test_transaction_rolls_back_on_panic() {
    let repo = spawn_store().await.repository();

    let outcome = AssertUnwindSafe(repo.transaction::<_, (), RepoError>(|tx| {
        Box::pin(async move {
            let mut user = User::new("panic@example.com", "digest");
            tx.user_create(&mut user).await?;
            panic!("forced failure after insert");
            Ok(())
        })
    }))
    .catch_unwind()
    .await;

    assert!(outcome.is_err(), "panic must propagate to the caller");
    assert_eq!(repo.users_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_nested_transaction_joins_outer_one() {
    let repo = spawn_store().await.repository();

    let result = repo
        .transaction::<_, (), RepoError>(|tx| {
            Box::pin(async move {
                tx.transaction::<_, (), RepoError>(|inner| {
                    Box::pin(async move {
                        let mut user = User::new("nested@example.com", "digest");
                        inner.user_create(&mut user).await?;
                        Ok(())
                    })
                })
                .await?;

                // The inner call did not commit on its own.
                Err(RepoError::MalformedRow("forced".to_string()))
            })
        })
        .await;

    assert!(result.is_err());
    assert_eq!(repo.users_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_rows_are_no_record() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;

    assert!(matches!(repo.series_get(99).await, Err(RepoError::NoRecord)));
    assert!(matches!(repo.movie_get(99).await, Err(RepoError::NoRecord)));
    assert!(matches!(repo.user_get(99).await, Err(RepoError::NoRecord)));
    assert!(matches!(
        repo.episode_get(EpisodeKey::new(1, 1, 1)).await,
        Err(RepoError::NoRecord)
    ));
    assert!(matches!(
        repo.movie_update(99, FilmPatch::default(), user_id).await,
        Err(RepoError::NoRecord)
    ));
    assert!(matches!(
        repo.series_invalidate(99, "gone".to_string(), user_id).await,
        Err(RepoError::NoRecord)
    ));
    assert!(matches!(
        repo.episode_invalidate(EpisodeKey::new(1, 1, 1), "gone".to_string(), user_id)
            .await,
        Err(RepoError::NoRecord)
    ));
}

#[tokio::test]
async fn test_movie_and_episode_do_not_leak_into_each_other() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;
    let series_id = seed_series(&repo, user_id).await;
    let key = EpisodeKey::new(series_id, 1, 1);
    let episode_id = seed_episode(&repo, key, "Secrets", user_id).await;

    let mut movie = Movie::new(FilmContent::new("Heat", date(1995, 12, 15)));
    repo.movie_create(&mut movie, user_id).await.unwrap();

    assert!(matches!(repo.movie_get(episode_id).await, Err(RepoError::NoRecord)));
    assert_eq!(repo.movies_count().await.unwrap(), 1);
    assert_eq!(repo.episodes_count_by_series(series_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_partial_update_touches_only_submitted_fields() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;

    let mut content = FilmContent::new("Heat", date(1995, 12, 15));
    content.descriptions = Some("A heist film".to_string());
    content.duration = Some(170);
    let mut movie = Movie::new(content);
    repo.movie_create(&mut movie, user_id).await.unwrap();

    let patch = FilmPatch {
        title: Some(String::new()),
        ..Default::default()
    };
    repo.movie_update(movie.id, patch, user_id).await.unwrap();

    let stored = repo.movie_get(movie.id).await.unwrap();
    assert_eq!(stored.content.title, "");
    assert_eq!(stored.content.descriptions.as_deref(), Some("A heist film"));
    assert_eq!(stored.content.duration, Some(170));
    assert_eq!(stored.content.date_released, date(1995, 12, 15));
}

#[tokio::test]
async fn test_audits_are_appended_newest_first() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;
    let series_id = seed_series(&repo, user_id).await;

    for title in ["Dark S1", "Dark S2"] {
        let patch = SeriesPatch {
            title: Some(title.to_string()),
            ..Default::default()
        };
        repo.series_update(series_id, patch, user_id).await.unwrap();
    }

    let audits = repo
        .series_audits_get_all(series_id, Page::new(0, 10))
        .await
        .unwrap();
    let titles: Vec<_> = audits.iter().map(|s| s.title.as_str()).collect();

    assert_eq!(repo.series_audits_count(series_id).await.unwrap(), 3);
    assert_eq!(titles, ["Dark S2", "Dark S1", "Dark"]);
    assert!(audits.iter().all(|s| s.id == series_id));
}

#[tokio::test]
async fn test_series_cascade_invalidates_all_episodes() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;
    let series_id = seed_series(&repo, user_id).await;

    for key in [
        EpisodeKey::new(series_id, 1, 1),
        EpisodeKey::new(series_id, 1, 2),
        EpisodeKey::new(series_id, 2, 1),
    ] {
        seed_episode(&repo, key, "Episode", user_id).await;
    }

    let count = repo
        .episodes_invalidate_all_by_series(series_id, "copyright".to_string(), user_id)
        .await
        .unwrap();
    assert_eq!(count, 3);

    let episodes = repo
        .episodes_get_all_by_series(series_id, Page::new(0, 10))
        .await
        .unwrap();
    assert!(
        episodes
            .iter()
            .all(|e| e.invalidation.as_deref() == Some("copyright"))
    );
}

#[tokio::test]
async fn test_bulk_invalidate_without_episodes_is_no_record() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;
    let series_id = seed_series(&repo, user_id).await;

    let result = repo
        .episodes_invalidate_all_by_series(series_id, "copyright".to_string(), user_id)
        .await;

    assert!(matches!(result, Err(RepoError::NoRecord)));
}

#[tokio::test]
async fn test_duplicate_email_is_a_unique_violation() {
    let repo = spawn_store().await.repository();
    seed_user(&repo, "jane@example.com").await;

    let mut duplicate = User::new("jane@example.com", "digest");
    let err = repo.user_create(&mut duplicate).await.unwrap_err();

    assert!(err.is_unique_violation());
    assert_eq!(repo.users_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_episode_put_overwrites_and_clears_invalidation() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;
    let series_id = seed_series(&repo, user_id).await;
    let key = EpisodeKey::new(series_id, 1, 1);

    let first_id = seed_episode(&repo, key, "Secrets", user_id).await;
    repo.episode_invalidate(key, "duplicate".to_string(), user_id)
        .await
        .unwrap();
    let second_id = seed_episode(&repo, key, "Lies", user_id).await;

    assert_eq!(first_id, second_id);

    let stored = repo.episode_get(key).await.unwrap();
    assert_eq!(stored.content.title, "Lies");
    assert_eq!(stored.invalidation, None);
    assert_eq!(repo.episode_audits_count(key).await.unwrap(), 3);
}

#[tokio::test]
async fn test_user_update_with_empty_patch_checks_existence() {
    let repo = spawn_store().await.repository();
    let user_id = seed_user(&repo, "jane@example.com").await;

    assert!(repo.user_update(user_id, Default::default()).await.is_ok());
    assert!(matches!(
        repo.user_update(user_id + 1, Default::default()).await,
        Err(RepoError::NoRecord)
    ));
}
