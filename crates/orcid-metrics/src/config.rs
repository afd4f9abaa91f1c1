//! Configuration for the ORCID metrics pipeline.

use std::time::Duration;

use anyhow::Context;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// ORCID public API (v3.0).
    pub const ORCID_API: &str = "https://pub.orcid.org/v3.0";

    /// OpenAlex API root.
    pub const OPENALEX_API: &str = "https://api.openalex.org";

    /// Per-request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Budget for one whole aggregation call.
    pub const OVERALL_TIMEOUT: Duration = Duration::from_secs(120);

    /// Maximum identifier values in one OpenAlex filter (hard upstream limit).
    pub const CHUNK_SIZE: usize = 100;

    /// Concurrent in-flight citation chunk requests.
    pub const MAX_CONCURRENCY: usize = 15;

    /// Retries after the first attempt on retryable failures.
    pub const MAX_RETRIES: u32 = 5;

    /// Smallest backoff between retries.
    pub const RETRY_MIN_BACKOFF: Duration = Duration::from_secs(1);

    /// Largest backoff between retries.
    pub const RETRY_MAX_BACKOFF: Duration = Duration::from_secs(30);

    /// Registry payload cache TTL (5 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(300);

    /// Maximum cached registry payloads.
    pub const CACHE_MAX_SIZE: u64 = 1000;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// User agent sent to both upstreams.
    pub const USER_AGENT: &str = concat!("orcid-metrics/", env!("CARGO_PKG_VERSION"));
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Contact address for the OpenAlex polite pool (optional).
    pub mailto: Option<String>,

    /// Base URL for the ORCID API (for testing with mock servers).
    pub orcid_api_url: String,

    /// Base URL for the OpenAlex API (for testing with mock servers).
    pub openalex_api_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Budget for one whole pipeline operation.
    pub overall_timeout: Duration,

    /// Identifier values per citation query.
    pub chunk_size: usize,

    /// Concurrent citation chunk requests (1 = sequential).
    pub max_concurrency: usize,

    /// Retries on retryable failures.
    pub max_retries: u32,

    /// Backoff lower bound.
    pub retry_min_backoff: Duration,

    /// Backoff upper bound.
    pub retry_max_backoff: Duration,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,
}

impl Config {
    /// Create a new configuration with an optional OpenAlex contact address.
    #[must_use]
    pub fn new(mailto: Option<String>) -> Self {
        Self {
            mailto,
            orcid_api_url: api::ORCID_API.to_string(),
            openalex_api_url: api::OPENALEX_API.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            overall_timeout: api::OVERALL_TIMEOUT,
            chunk_size: api::CHUNK_SIZE,
            max_concurrency: api::MAX_CONCURRENCY,
            max_retries: api::MAX_RETRIES,
            retry_min_backoff: api::RETRY_MIN_BACKOFF,
            retry_max_backoff: api::RETRY_MAX_BACKOFF,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
        }
    }

    /// Create a test configuration with custom URLs for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            mailto: None,
            orcid_api_url: format!("{}/orcid/v3.0", base_url),
            openalex_api_url: format!("{}/openalex", base_url),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            overall_timeout: Duration::from_secs(10),
            chunk_size: api::CHUNK_SIZE,
            max_concurrency: api::MAX_CONCURRENCY,
            max_retries: 2,
            retry_min_backoff: Duration::from_millis(1), // Fast retries in tests
            retry_max_backoff: Duration::from_millis(5),
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new(std::env::var("OPENALEX_MAILTO").ok());

        if let Ok(url) = std::env::var("ORCID_API_URL") {
            config.orcid_api_url = url;
        }
        if let Ok(url) = std::env::var("OPENALEX_API_URL") {
            config.openalex_api_url = url;
        }
        if let Ok(raw) = std::env::var("ORCID_METRICS_MAX_CONCURRENCY") {
            config.max_concurrency =
                raw.parse().context("ORCID_METRICS_MAX_CONCURRENCY must be an integer")?;
        }
        if let Ok(raw) = std::env::var("ORCID_METRICS_TIMEOUT_SECS") {
            let secs: u64 =
                raw.parse().context("ORCID_METRICS_TIMEOUT_SECS must be an integer")?;
            config.overall_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns error on a zero chunk size or zero concurrency.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.max_concurrency > 0, "max_concurrency must be at least 1");
        anyhow::ensure!(
            (1..=api::CHUNK_SIZE).contains(&self.chunk_size),
            "chunk_size must be between 1 and {}",
            api::CHUNK_SIZE
        );
        Ok(())
    }

    /// Check if a polite-pool contact address is configured.
    #[must_use]
    pub const fn has_mailto(&self) -> bool {
        self.mailto.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}
