//! The aggregation pipeline.
//!
//! registry payload → [`extract`] → [`CitationFetcher`] → [`aggregate`] →
//! [`compute`]. Every public operation runs under one overall timeout and
//! returns either a complete result or a [`MetricsError`].

mod aggregate;
mod dedupe;
mod extract;
mod fetch;
mod metrics;

use std::future::Future;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

use regex::Regex;

pub use aggregate::aggregate;
pub use dedupe::{
    Identified, WorkFilter, dedupe, filter_by_keyword, filter_by_year, sort_by_citations,
};
pub use extract::extract;
pub use fetch::{CitationFetcher, chunk_values};
pub use metrics::{compute, compute_at, h_index, i10_index, round2};

use crate::client::{CitationIndex, HttpClient, OpenAlexClient, OrcidClient, WorkRegistry};
use crate::config::Config;
use crate::error::{MetricsError, PipelineResult};
use crate::models::{
    CitedWork, IdentifierKey, MetricsReport, MetricsResult, WorkRecord, WorksPayload, YearSeries,
};

static ORCID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").expect("valid ORCID pattern"));

/// Entry point for every metrics operation.
///
/// Cheap to share behind an `Arc`; the HTTP session and the concurrency bound
/// are shared by all concurrent calls.
#[derive(Clone)]
pub struct MetricsPipeline {
    registry: Arc<dyn WorkRegistry>,
    fetcher: CitationFetcher,
    overall_timeout: Duration,
}

impl MetricsPipeline {
    /// Build the pipeline against the live ORCID and OpenAlex APIs.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let http = HttpClient::new(config)?;
        let registry = Arc::new(OrcidClient::new(http.clone(), config));
        let index = Arc::new(OpenAlexClient::new(http, config));
        Ok(Self::with_sources(registry, index, config))
    }

    /// Build the pipeline over arbitrary upstreams.
    #[must_use]
    pub fn with_sources(
        registry: Arc<dyn WorkRegistry>,
        index: Arc<dyn CitationIndex>,
        config: &Config,
    ) -> Self {
        Self {
            registry,
            fetcher: CitationFetcher::new(index, config.max_concurrency, config.chunk_size),
            overall_timeout: config.overall_timeout,
        }
    }

    /// Per-year publication and citation counts.
    pub async fn get_time_series(&self, orcid: &str) -> PipelineResult<YearSeries> {
        Ok(self.get_report(orcid).await?.series)
    }

    /// Scalar indicators.
    pub async fn get_metrics(&self, orcid: &str) -> PipelineResult<MetricsResult> {
        Ok(self.get_report(orcid).await?.metrics)
    }

    /// Series and indicators from one registry read.
    pub async fn get_report(&self, orcid: &str) -> PipelineResult<MetricsReport> {
        let orcid = validate_orcid(orcid)?;
        self.bounded(&orcid, async {
            let payload = self.load_works(&orcid).await?;
            let (ids, no_ids) = extract(&payload.groups());
            let citations = self.fetcher.fetch_citations(&ids).await?;

            let series = aggregate(&ids, &no_ids, &citations);
            let metrics = compute(&series, &ids, &no_ids, &citations);

            tracing::info!(
                orcid = %orcid,
                publications = metrics.total_publications,
                citations = metrics.total_citations,
                h_index = metrics.h_index,
                "Metrics computed"
            );

            Ok(MetricsReport { orcid_id: orcid.clone(), series, metrics })
        })
        .await
    }

    /// Every work in registry order with its citation count.
    pub async fn works_with_citations(&self, orcid: &str) -> PipelineResult<Vec<CitedWork>> {
        let orcid = validate_orcid(orcid)?;
        self.bounded(&orcid, async {
            let works = self.load_works(&orcid).await?.records();
            self.attach_citations(works).await
        })
        .await
    }

    /// Filtered works, deduplicated by identifier, most cited first.
    pub async fn works_by_citations(
        &self,
        orcid: &str,
        filter: &WorkFilter,
    ) -> PipelineResult<Vec<CitedWork>> {
        let orcid = validate_orcid(orcid)?;
        self.bounded(&orcid, async {
            let works = filter.apply(self.load_works(&orcid).await?.records());
            let mut works = dedupe(self.attach_citations(works).await?);
            sort_by_citations(&mut works);
            Ok(works)
        })
        .await
    }

    /// Filtered works without citation lookups.
    pub async fn filter_works(
        &self,
        orcid: &str,
        filter: &WorkFilter,
    ) -> PipelineResult<Vec<WorkRecord>> {
        let orcid = validate_orcid(orcid)?;
        self.bounded(&orcid, async {
            Ok(filter.apply(self.load_works(&orcid).await?.records()))
        })
        .await
    }

    async fn load_works(&self, orcid: &str) -> PipelineResult<WorksPayload> {
        let payload = self
            .registry
            .fetch_works(orcid)
            .await
            .map_err(|e| {
                tracing::warn!(
                    orcid,
                    retryable = e.is_retryable(),
                    error = %e,
                    "Work registry request failed"
                );
                MetricsError::registry(orcid, e)
            })?
            .unwrap_or_default();

        let groups = payload.group.as_ref().map_or(0, Vec::len);
        tracing::debug!(orcid, groups, "Works loaded");
        Ok(payload)
    }

    async fn attach_citations(&self, works: Vec<WorkRecord>) -> PipelineResult<Vec<CitedWork>> {
        let keyed: Vec<(WorkRecord, Option<IdentifierKey>)> = works
            .into_iter()
            .map(|work| {
                let key = work.primary_identifier();
                (work, key)
            })
            .collect();

        let citations = self.fetcher.fetch_keys(keyed.iter().filter_map(|(_, k)| k.as_ref())).await?;

        Ok(keyed
            .into_iter()
            .map(|(work, identifier)| {
                let cited_by_count =
                    identifier.as_ref().and_then(|k| citations.get(k)).copied().unwrap_or(0);
                CitedWork { work, identifier, cited_by_count }
            })
            .collect())
    }

    async fn bounded<T, F>(&self, orcid: &str, operation: F) -> PipelineResult<T>
    where
        F: Future<Output = PipelineResult<T>>,
    {
        let start = Instant::now();
        let result = tokio::time::timeout(self.overall_timeout, operation).await;
        match result {
            Ok(inner) => {
                tracing::debug!(orcid, elapsed_ms = start.elapsed().as_millis(), "Operation finished");
                inner
            }
            Err(_) => {
                tracing::warn!(orcid, timeout = ?self.overall_timeout, "Operation timed out");
                Err(MetricsError::Timeout(self.overall_timeout))
            }
        }
    }
}

impl std::fmt::Debug for MetricsPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsPipeline")
            .field("fetcher", &self.fetcher)
            .field("overall_timeout", &self.overall_timeout)
            .finish_non_exhaustive()
    }
}

/// Canonical ORCID iD from a bare iD or an `orcid.org` URL.
///
/// # Errors
///
/// Returns [`MetricsError::Validation`] when the shape or the ISO 7064 mod 11-2
/// check digit is wrong.
pub fn validate_orcid(raw: &str) -> PipelineResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MetricsError::validation("orcid_id", "cannot be empty"));
    }

    let bare = ["https://orcid.org/", "http://orcid.org/", "orcid.org/"]
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_uppercase();

    if !ORCID_PATTERN.is_match(&bare) {
        return Err(MetricsError::validation(
            "orcid_id",
            format!("'{trimmed}' is not of the form 0000-0000-0000-000X"),
        ));
    }
    if !checksum_ok(&bare) {
        return Err(MetricsError::validation("orcid_id", format!("'{bare}' has a bad check digit")));
    }
    Ok(bare)
}

/// ISO 7064 mod 11-2 over the first 15 digits.
fn checksum_ok(orcid: &str) -> bool {
    let chars: Vec<char> = orcid.chars().filter(|c| *c != '-').collect();
    let Some((&check, digits)) = chars.split_last() else {
        return false;
    };

    let mut total = 0_u32;
    for c in digits {
        let Some(d) = c.to_digit(10) else {
            return false;
        };
        total = (total + d) * 2;
    }
    let expected = (12 - total % 11) % 11;
    match check {
        'X' => expected == 10,
        c => c.to_digit(10) == Some(expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_orcid_forms() {
        assert_eq!(validate_orcid("0000-0002-1825-0097").unwrap(), "0000-0002-1825-0097");
        assert_eq!(
            validate_orcid(" https://orcid.org/0000-0002-1825-0097 ").unwrap(),
            "0000-0002-1825-0097"
        );
        assert_eq!(validate_orcid("0000-0002-9079-593x").unwrap(), "0000-0002-9079-593X");
    }

    #[test]
    fn test_validate_orcid_rejects() {
        for bad in ["", "0000-0002-1825", "abcd-0002-1825-0097", "0000-0002-1825-0098"] {
            assert!(
                matches!(validate_orcid(bad), Err(MetricsError::Validation { .. })),
                "{bad} should be rejected"
            );
        }
    }
}
