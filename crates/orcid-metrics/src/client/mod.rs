//! Upstream API clients.
//!
//! Provides one shared async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff on 429/500/502/503/504
//! - Optional response caching with a TTL
//!
//! and the two narrow upstream contracts the pipeline consumes:
//! [`WorkRegistry`] (ORCID) and [`CitationIndex`] (OpenAlex).

mod middleware;
mod openalex;
mod orcid;

pub use middleware::{RETRYABLE_STATUSES, StatusListStrategy, classify_status};
pub use openalex::OpenAlexClient;
pub use orcid::OrcidClient;

use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use reqwest_middleware::ClientWithMiddleware;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{CitationRecord, IdType, WorksPayload};

/// Read access to a researcher's works.
#[async_trait::async_trait]
pub trait WorkRegistry: Send + Sync {
    /// Fetch the grouped works of a researcher. `None` means the registry sent no payload.
    async fn fetch_works(&self, orcid_id: &str) -> ClientResult<Option<WorksPayload>>;
}

/// Citation-count lookup by identifier.
#[async_trait::async_trait]
pub trait CitationIndex: Send + Sync {
    /// Query works whose `id_type` is one of `values` (at most one chunk).
    async fn query_by_identifiers(
        &self,
        id_type: IdType,
        values: &[String],
    ) -> ClientResult<Vec<CitationRecord>>;
}

/// Shared HTTP session: connection pool, retry policy and cache.
///
/// Built once per process; clones share the pool and the cache.
#[derive(Clone)]
pub struct HttpClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Response cache.
    cache: Cache<String, serde_json::Value>,

    /// Per-request timeout, reported by [`ClientError::Timeout`].
    request_timeout: Duration,
}

impl HttpClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(user_agent(config))
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let client = middleware::with_retries(client, config);

        let cache = Cache::builder()
            .max_capacity(config.cache_max_size)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self { client, cache, request_timeout: config.request_timeout })
    }

    /// GET and decode JSON, bypassing the cache.
    pub(crate) async fn get_json<T>(&self, url: &str, params: &[(String, String)]) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let value = self.fetch(url, params).await?;
        serde_json::from_value(value).map_err(ClientError::from)
    }

    /// GET and decode JSON, serving repeated requests from the cache.
    pub(crate) async fn get_json_cached<T>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> ClientResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let cache_key = cache_key("GET", url, params);
        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::debug!(url, "Cache hit");
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        let value = self.fetch(url, params).await?;
        self.cache.insert(cache_key, value.clone()).await;

        serde_json::from_value(value).map_err(ClientError::from)
    }

    async fn fetch(&self, url: &str, params: &[(String, String)]) -> ClientResult<serde_json::Value> {
        let response = self.client.get(url).query(params).send().await.map_err(|e| match e {
            reqwest_middleware::Error::Reqwest(e) => self.transport_error(e),
            e => ClientError::Middleware(e),
        })?;
        let response = handle_response(response).await?;
        response.json().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.request_timeout)
        } else {
            ClientError::Http(error)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").field("cached_entries", &self.cache.entry_count()).finish()
    }
}

fn user_agent(config: &Config) -> String {
    match &config.mailto {
        Some(mailto) => format!("{} (mailto:{mailto})", api::USER_AGENT),
        None => api::USER_AGENT.to_string(),
    }
}

/// Map API response status codes to errors.
async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        429 => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);

            Err(ClientError::rate_limited(retry_after))
        }
        404 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::not_found(text))
        }
        400 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::bad_request(text))
        }
        500..=599 => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::server(status.as_u16(), text))
        }
        _ => {
            let text = response.text().await.unwrap_or_default();
            Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
        }
    }
}

/// Generate cache key.
fn cache_key(method: &str, url: &str, params: &[(String, String)]) -> String {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update(method.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    hasher.update(b"|");

    for (k, v) in params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}
