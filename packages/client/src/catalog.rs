//! Quiz catalog cache.
//!
//! The catalog is fetched at most once per cache miss: concurrent callers
//! await the same in-flight request and observe the same result. Failures are
//! logged and show up as an empty list without being cached.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use quizroom_server::infrastructure::dto::websocket::QuizSummaryDto;
use reqwest::StatusCode;
use tokio::sync::Mutex;

use crate::error::ClientError;

/// Source of the quiz catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self, token: &str) -> Result<Vec<QuizSummaryDto>, ClientError>;
}

/// Fetches `GET {api_url}/api/quizzes` with bearer auth
pub struct HttpCatalogFetcher {
    client: reqwest::Client,
    api_url: String,
}

impl HttpCatalogFetcher {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch(&self, token: &str) -> Result<Vec<QuizSummaryDto>, ClientError> {
        let url = format!("{}/api/quizzes", self.api_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ClientError::Catalog(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        response
            .error_for_status()
            .map_err(|e| ClientError::Catalog(e.to_string()))?
            .json::<Vec<QuizSummaryDto>>()
            .await
            .map_err(|e| ClientError::Catalog(e.to_string()))
    }
}

type SharedFetch = Shared<BoxFuture<'static, Option<Vec<QuizSummaryDto>>>>;

#[derive(Default)]
struct CacheState {
    catalog: Option<Vec<QuizSummaryDto>>,
    in_flight: Option<(u64, SharedFetch)>,
    next_fetch_id: u64,
}

/// Single-flight cache in front of a [`CatalogFetcher`]
pub struct QuizCatalogCache {
    fetcher: Arc<dyn CatalogFetcher>,
    state: Mutex<CacheState>,
}

impl QuizCatalogCache {
    pub fn new(fetcher: Arc<dyn CatalogFetcher>) -> Self {
        Self {
            fetcher,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Return the catalog, fetching it on a cache miss.
    ///
    /// Without a token nothing is fetched and the list is empty.
    pub async fn get(&self, token: Option<&str>) -> Vec<QuizSummaryDto> {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return Vec::new();
        };

        let (fetch_id, fetch) = {
            let mut state = self.state.lock().await;
            if let Some(catalog) = &state.catalog {
                return catalog.clone();
            }
            match &state.in_flight {
                Some(in_flight) => in_flight.clone(),
                None => {
                    let in_flight = (state.next_fetch_id, self.start_fetch(token));
                    state.next_fetch_id += 1;
                    state.in_flight = Some(in_flight.clone());
                    in_flight
                }
            }
        };

        let result = fetch.await;

        let mut state = self.state.lock().await;
        // Only the fetch still registered may settle the cache; an invalidated
        // one just hands its result to the callers already waiting on it.
        if state
            .in_flight
            .as_ref()
            .is_some_and(|(id, _)| *id == fetch_id)
        {
            state.in_flight = None;
            if let Some(catalog) = &result {
                state.catalog = Some(catalog.clone());
            }
        }

        result.unwrap_or_default()
    }

    /// Forget the cached catalog and any fetch in flight.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.catalog = None;
        state.in_flight = None;
    }

    fn start_fetch(&self, token: &str) -> SharedFetch {
        let fetcher = self.fetcher.clone();
        let token = token.to_string();
        async move {
            tracing::debug!("Fetching quiz catalog");
            match fetcher.fetch(&token).await {
                Ok(catalog) => Some(catalog),
                Err(e) => {
                    tracing::warn!("Failed to fetch quiz catalog: {}", e);
                    None
                }
            }
        }
        .boxed()
        .shared()
    }
}
