//! Retry middleware for the shared HTTP client.
//!
//! Only a fixed set of statuses is retried; everything else fails on the first
//! answer so callers see the real status.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::{
    Retryable, RetryableStrategy, RetryTransientMiddleware, default_on_request_failure,
};

use crate::config::Config;

/// Statuses worth another attempt.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retries [`RETRYABLE_STATUSES`] and transient transport failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusListStrategy;

impl RetryableStrategy for StatusListStrategy {
    fn handle(
        &self,
        res: &Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) => classify_status(response.status().as_u16()),
            Err(error) => default_on_request_failure(error),
        }
    }
}

/// Retry decision for a status code; `None` means success.
#[must_use]
pub fn classify_status(status: u16) -> Option<Retryable> {
    if (200..300).contains(&status) {
        None
    } else if RETRYABLE_STATUSES.contains(&status) {
        Some(Retryable::Transient)
    } else {
        Some(Retryable::Fatal)
    }
}

/// Wrap a reqwest client with exponential-backoff retries from the config.
#[must_use]
pub fn with_retries(client: reqwest::Client, config: &Config) -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder()
        .retry_bounds(config.retry_min_backoff, config.retry_max_backoff)
        .build_with_max_retries(config.max_retries);

    ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy_and_strategy(
            retry_policy,
            StatusListStrategy,
        ))
        .build()
}
