//! Batched citation retrieval.
//!
//! Identifiers are grouped by type and split into chunks of at most
//! `chunk_size` values. Every chunk is one [`CitationIndex`] call; chunks of all
//! types run concurrently, bounded by a semaphore shared by every fetch in the
//! process. Retries happen below this layer, in the HTTP middleware.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::Semaphore;

use crate::client::CitationIndex;
use crate::error::{MetricsError, PipelineResult};
use crate::models::{CitationMap, IdType, IdentifierKey, IdentifierYearMap};

/// Resolves citation counts for identifier maps.
#[derive(Clone)]
pub struct CitationFetcher {
    index: Arc<dyn CitationIndex>,
    permits: Arc<Semaphore>,
    chunk_size: usize,
}

impl CitationFetcher {
    /// Create a fetcher over `index` with at most `max_concurrency` chunks in flight.
    #[must_use]
    pub fn new(index: Arc<dyn CitationIndex>, max_concurrency: usize, chunk_size: usize) -> Self {
        Self::with_semaphore(index, Arc::new(Semaphore::new(max_concurrency.max(1))), chunk_size)
    }

    /// Create a fetcher that draws permits from an existing semaphore.
    #[must_use]
    pub fn with_semaphore(
        index: Arc<dyn CitationIndex>,
        permits: Arc<Semaphore>,
        chunk_size: usize,
    ) -> Self {
        Self { index, permits, chunk_size: chunk_size.max(1) }
    }

    /// Citation count for every key of `ids`.
    ///
    /// The result holds exactly the requested keys; a key the index did not
    /// return maps to 0. Any chunk failing after retries fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::CitationServiceUnavailable`] for the first failing chunk.
    pub async fn fetch_citations(&self, ids: &IdentifierYearMap) -> PipelineResult<CitationMap> {
        self.fetch_keys(ids.keys()).await
    }

    /// Citation count for every given key, with the guarantees of [`Self::fetch_citations`].
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::CitationServiceUnavailable`] for the first failing chunk.
    pub async fn fetch_keys<'a, I>(&self, keys: I) -> PipelineResult<CitationMap>
    where
        I: IntoIterator<Item = &'a IdentifierKey> + Send,
    {
        let requested: HashSet<&IdentifierKey> = keys.into_iter().collect();
        let plan = group_by_type(requested.iter().copied());

        let chunks = plan.iter().flat_map(|(&id_type, values)| {
            chunk_values(values, self.chunk_size).into_iter().map(move |chunk| (id_type, chunk))
        });

        let requests = chunks.map(|(id_type, chunk)| self.fetch_chunk(id_type, chunk, &requested));
        let partials = try_join_all(requests).await?;

        let mut citations = CitationMap::with_capacity(requested.len());
        for partial in partials {
            citations.extend(partial);
        }

        let found = citations.len();
        for &key in &requested {
            citations.entry(key.clone()).or_insert(0);
        }

        tracing::info!(
            requested = requested.len(),
            found,
            zero_filled = requested.len() - found,
            "Citations fetched"
        );

        Ok(citations)
    }

    async fn fetch_chunk(
        &self,
        id_type: IdType,
        chunk: Vec<String>,
        requested: &HashSet<&IdentifierKey>,
    ) -> PipelineResult<CitationMap> {
        // The semaphore is never closed; a closed one would only lift the bound.
        let _permit = self.permits.acquire().await.ok();

        let records = self
            .index
            .query_by_identifiers(id_type, &chunk)
            .await
            .map_err(|e| {
                tracing::warn!(
                    id_type = %id_type,
                    size = chunk.len(),
                    retryable = e.is_retryable(),
                    error = %e,
                    "Citation chunk failed"
                );
                MetricsError::citations(id_type, e)
            })?;

        let mut partial = CitationMap::with_capacity(chunk.len());
        for record in records {
            match record.key(id_type) {
                Some(key) if requested.contains(&key) => {
                    partial.insert(key, record.citations());
                }
                Some(key) => tracing::debug!(key = %key, "Ignoring unrequested identifier"),
                None => tracing::debug!(id_type = %id_type, "Citation record without identifier"),
            }
        }
        Ok(partial)
    }
}

impl std::fmt::Debug for CitationFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationFetcher")
            .field("available_permits", &self.permits.available_permits())
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

/// Normalized values per identifier type, sorted for a stable request plan.
fn group_by_type<'a>(keys: impl Iterator<Item = &'a IdentifierKey>) -> BTreeMap<IdType, Vec<String>> {
    let mut plan: BTreeMap<IdType, Vec<String>> = BTreeMap::new();
    for key in keys {
        plan.entry(key.id_type()).or_default().push(key.value().to_string());
    }
    for values in plan.values_mut() {
        values.sort_unstable();
    }
    plan
}

/// Split values into consecutive chunks of at most `size`.
#[must_use]
pub fn chunk_values(values: &[String], size: usize) -> Vec<Vec<String>> {
    values.chunks(size.max(1)).map(<[String]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::error::{ClientError, ClientResult};
    use crate::models::CitationRecord;

    /// Answers every requested DOI with a fixed count, plus one stray record.
    struct FixedIndex {
        calls: Mutex<Vec<usize>>,
    }

    #[async_trait::async_trait]
    impl CitationIndex for FixedIndex {
        async fn query_by_identifiers(
            &self,
            _id_type: IdType,
            values: &[String],
        ) -> ClientResult<Vec<CitationRecord>> {
            self.calls.lock().unwrap().push(values.len());
            let mut records: Vec<CitationRecord> = values
                .iter()
                .skip(1)
                .map(|v| CitationRecord {
                    doi: Some(format!("https://doi.org/{v}")),
                    cited_by_count: Some(3),
                    ..Default::default()
                })
                .collect();
            records.push(CitationRecord {
                doi: Some("10.9/unrequested".to_string()),
                cited_by_count: Some(99),
                ..Default::default()
            });
            Ok(records)
        }
    }

    struct DownIndex;

    #[async_trait::async_trait]
    impl CitationIndex for DownIndex {
        async fn query_by_identifiers(
            &self,
            _id_type: IdType,
            _values: &[String],
        ) -> ClientResult<Vec<CitationRecord>> {
            Err(ClientError::server(503, "down"))
        }
    }

    /// Tracks how many queries are running at once.
    #[derive(Default)]
    struct GaugedIndex {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl CitationIndex for GaugedIndex {
        async fn query_by_identifiers(
            &self,
            _id_type: IdType,
            _values: &[String],
        ) -> ClientResult<Vec<CitationRecord>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    fn doi_map(n: usize) -> IdentifierYearMap {
        (0..n)
            .map(|i| (IdentifierKey::new(IdType::Doi, &format!("10.1/{i:04}")).unwrap(), 2020))
            .collect()
    }

    #[test]
    fn test_chunk_values_sizes() {
        let values: Vec<String> = (0..250).map(|i| i.to_string()).collect();
        let sizes: Vec<usize> = chunk_values(&values, 100).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert!(chunk_values(&[], 100).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_is_complete_and_only_requested() {
        let index = Arc::new(FixedIndex { calls: Mutex::new(Vec::new()) });
        let fetcher = CitationFetcher::new(index.clone(), 2, 100);
        let ids = doi_map(250);

        let citations = fetcher.fetch_citations(&ids).await.unwrap();

        assert_eq!(citations.len(), 250);
        assert!(ids.keys().all(|k| citations.contains_key(k)));
        assert_eq!(citations.values().filter(|&&c| c == 0).count(), 3);

        let mut calls = index.calls.lock().unwrap().clone();
        calls.sort_unstable();
        assert_eq!(calls, vec![50, 100, 100]);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let fetcher = CitationFetcher::new(Arc::new(DownIndex), 1, 100);
        let err = fetcher.fetch_citations(&doi_map(3)).await.unwrap_err();
        assert!(matches!(
            err,
            MetricsError::CitationServiceUnavailable { id_type: IdType::Doi, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_map_makes_no_calls() {
        let index = Arc::new(FixedIndex { calls: Mutex::new(Vec::new()) });
        let fetcher = CitationFetcher::new(index.clone(), 1, 100);
        let citations = fetcher.fetch_citations(&IdentifierYearMap::new()).await.unwrap();
        assert!(citations.is_empty());
        assert!(index.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrency_bound_holds() {
        let index = Arc::new(GaugedIndex::default());
        let fetcher = CitationFetcher::new(index.clone(), 3, 10);

        let citations = fetcher.fetch_citations(&doi_map(250)).await.unwrap();

        assert_eq!(citations.len(), 250);
        assert_eq!(index.calls.load(Ordering::SeqCst), 25);
        assert_eq!(index.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_shared_semaphore_bounds_concurrent_fetches() {
        let index = Arc::new(GaugedIndex::default());
        let permits = Arc::new(Semaphore::new(2));
        let first = CitationFetcher::with_semaphore(index.clone(), permits.clone(), 10);
        let second = CitationFetcher::with_semaphore(index.clone(), permits, 10);

        let a = doi_map(100);
        let b = doi_map(120);
        let (left, right) = tokio::join!(first.fetch_citations(&a), second.fetch_citations(&b));

        assert_eq!(left.unwrap().len(), 100);
        assert_eq!(right.unwrap().len(), 120);
        assert_eq!(index.calls.load(Ordering::SeqCst), 22);
        assert!(index.peak.load(Ordering::SeqCst) <= 2);
    }
}
