//! Full-text search over serieses and movies.
//!
//! Searching is delegated to an Elasticsearch-compatible backend holding one
//! index per kind (`series` and `movie`). Keeping those indices in sync with
//! the database happens outside this process.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::SearchConfig;
use crate::db::Page;
use crate::models::{Movie, Paged, Series};

const SERIES_INDEX: &str = "series";
const MOVIE_INDEX: &str = "movie";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search is disabled")]
    Disabled,

    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid search URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Search backend returned {status}: {kind}: {reason}")]
    Backend {
        status: StatusCode,
        kind: String,
        reason: String,
    },
}

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search_serieses(&self, query: &str, page: Page) -> Result<Paged<Series>, SearchError>;

    async fn search_movies(&self, query: &str, page: Page) -> Result<Paged<Movie>, SearchError>;
}

/// Used when no search backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearch;

#[async_trait]
impl SearchService for DisabledSearch {
    async fn search_serieses(&self, _query: &str, _page: Page) -> Result<Paged<Series>, SearchError> {
        Err(SearchError::Disabled)
    }

    async fn search_movies(&self, _query: &str, _page: Page) -> Result<Paged<Movie>, SearchError> {
        Err(SearchError::Disabled)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    hits: Hits<T>,
}

#[derive(Debug, Deserialize)]
struct Hits<T> {
    total: Total,
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct Total {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_source")]
    source: T,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    reason: String,
}

#[derive(Clone)]
pub struct ElasticSearch {
    client: Client,
    base_url: Url,
}

impl ElasticSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("watch-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(&config.url)?,
        })
    }

    /// Creates the `series` and `movie` indices with their mappings when the
    /// backend does not have them yet.
    pub async fn ensure_indices(&self) -> Result<(), SearchError> {
        self.ensure_index(SERIES_INDEX, series_mappings()).await?;
        self.ensure_index(MOVIE_INDEX, movie_mappings()).await
    }

    async fn ensure_index(&self, index: &str, mappings: Value) -> Result<(), SearchError> {
        let url = self.base_url.join(index)?;

        let response = self.client.head(url.clone()).send().await?;
        if response.status() != StatusCode::NOT_FOUND {
            return Ok(());
        }

        let response = self.client.put(url).json(&mappings).send().await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        info!(index, "Created search index");
        Ok(())
    }

    async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        query: &str,
        page: Page,
    ) -> Result<Paged<T>, SearchError> {
        let url = self.base_url.join(&format!("{index}/_search"))?;
        let body = json!({
            "query": {
                "multi_match": {
                    "query": query,
                    "fields": ["title", "descriptions"],
                    "fuzziness": "AUTO"
                }
            },
            "from": page.offset,
            "size": page.limit,
            "track_total_hits": true
        });

        debug!(index, query, "Searching");

        let response = self.client.post(url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let parsed: SearchResponse<T> = response.json().await?;
        let items = parsed.hits.hits.into_iter().map(|h| h.source).collect();

        Ok(Paged::new(items, parsed.hits.total.value))
    }
}

#[async_trait]
impl SearchService for ElasticSearch {
    async fn search_serieses(&self, query: &str, page: Page) -> Result<Paged<Series>, SearchError> {
        self.search(SERIES_INDEX, query, page).await
    }

    async fn search_movies(&self, query: &str, page: Page) -> Result<Paged<Movie>, SearchError> {
        self.search(MOVIE_INDEX, query, page).await
    }
}

async fn backend_error(response: reqwest::Response) -> SearchError {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => SearchError::Backend {
            status,
            kind: body.error.kind,
            reason: body.error.reason,
        },
        Err(_) => SearchError::Backend {
            status,
            kind: "unknown".to_string(),
            reason: "unreadable error body".to_string(),
        },
    }
}

fn series_mappings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword", "index": false },
                "title": { "type": "text" },
                "descriptions": { "type": "text" },
                "date_started": { "type": "date", "index": false },
                "date_ended": { "type": "date", "index": false },
                "contributed_by": { "type": "keyword", "index": false },
                "contributed_at": { "type": "date", "index": false },
                "invalidation": { "type": "keyword", "index": false }
            }
        }
    })
}

fn movie_mappings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "keyword", "index": false },
                "title": { "type": "text" },
                "descriptions": { "type": "text" },
                "date_released": { "type": "date", "index": false },
                "duration": { "type": "short", "index": false },
                "contributed_by": { "type": "keyword", "index": false },
                "contributed_at": { "type": "date", "index": false },
                "invalidation": { "type": "keyword", "index": false }
            }
        }
    })
}
