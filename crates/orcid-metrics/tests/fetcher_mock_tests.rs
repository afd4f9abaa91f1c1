//! Citation fetcher tests against a mocked OpenAlex.
//!
//! Chunking, completeness, pagination and retry behavior of the batch fetcher.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use orcid_metrics::client::{HttpClient, OpenAlexClient};
use orcid_metrics::config::Config;
use orcid_metrics::error::{ClientError, MetricsError};
use orcid_metrics::models::{IdType, IdentifierKey, IdentifierYearMap};
use orcid_metrics::pipeline::CitationFetcher;

const WORKS_PATH: &str = "/openalex/works";

fn setup_fetcher(config: &Config) -> CitationFetcher {
    let http = HttpClient::new(config).unwrap();
    let index = Arc::new(OpenAlexClient::new(http, config));
    CitationFetcher::new(index, config.max_concurrency, config.chunk_size)
}

fn doi_map(n: usize) -> IdentifierYearMap {
    (0..n)
        .map(|i| (IdentifierKey::new(IdType::Doi, &format!("10.5555/w{i:04}")).unwrap(), 2020))
        .collect()
}

fn query(request: &Request, name: &str) -> Option<String> {
    request.url.query_pairs().find(|(k, _)| k == name).map(|(_, v)| v.into_owned())
}

/// Answers each requested DOI as an upper-case resolver URL with 7 citations.
struct EchoDois;

impl Respond for EchoDois {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let filter = query(request, "filter").unwrap_or_default();
        let values = filter.strip_prefix("doi:").unwrap_or_default();
        let results: Vec<_> = values
            .split('|')
            .filter(|v| !v.is_empty())
            .map(|v| json!({"doi": format!("https://doi.org/{}", v.to_uppercase()), "cited_by_count": 7}))
            .collect();
        ResponseTemplate::new(200)
            .set_body_json(json!({"results": results, "meta": {"next_cursor": null}}))
    }
}

/// [`EchoDois`] after a fixed delay, recording when each request arrived.
struct SlowEcho {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for SlowEcho {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        EchoDois.respond(request).set_delay(self.delay)
    }
}

/// Largest number of `[arrival, arrival + delay)` windows open at once.
///
/// Each client request holds its permit for at least its window, so this never
/// exceeds the real number of in-flight chunks.
fn peak_overlap(arrivals: &[Instant], delay: Duration) -> usize {
    arrivals
        .iter()
        .map(|&at| arrivals.iter().filter(|&&other| other <= at && at < other + delay).count())
        .max()
        .unwrap_or(0)
}

fn empty_page() -> serde_json::Value {
    json!({"results": [], "meta": {"count": 0, "next_cursor": null}})
}

// =============================================================================
// Chunking and completeness
// =============================================================================

#[tokio::test]
async fn test_250_identifiers_split_100_100_50() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);
    let ids = doi_map(250);

    let citations = fetcher.fetch_citations(&ids).await.unwrap();

    assert_eq!(citations.len(), 250);
    assert!(citations.values().all(|&c| c == 0));

    let requests = mock_server.received_requests().await.unwrap();
    let mut sizes: Vec<usize> = requests
        .iter()
        .map(|r| query(r, "filter").unwrap().split('|').count())
        .collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![50, 100, 100]);

    for r in &requests {
        assert_eq!(query(r, "select").as_deref(), Some("doi,cited_by_count"));
        assert_eq!(query(r, "cursor").as_deref(), Some("*"));
    }
}

#[tokio::test]
async fn test_returned_ids_normalized_and_complete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(EchoDois)
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);
    let ids = doi_map(120);

    let citations = fetcher.fetch_citations(&ids).await.unwrap();

    assert_eq!(citations.len(), ids.len());
    for key in ids.keys() {
        assert_eq!(citations[key], 7, "{key}");
    }
}

#[tokio::test]
async fn test_missing_and_unrequested_records() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .and(query_param("filter", "doi:10.1/a|10.1/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"doi": "https://doi.org/10.1/A", "cited_by_count": 12},
                {"doi": "https://doi.org/10.1/zzz", "cited_by_count": 500}
            ],
            "meta": {"next_cursor": null}
        })))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);
    let ids = IdentifierYearMap::from([
        (IdentifierKey::parse("doi:10.1/a").unwrap(), 2020),
        (IdentifierKey::parse("doi:10.1/b").unwrap(), 2021),
    ]);

    let citations = fetcher.fetch_citations(&ids).await.unwrap();

    assert_eq!(citations.len(), 2);
    assert_eq!(citations[&IdentifierKey::parse("doi:10.1/a").unwrap()], 12);
    assert_eq!(citations[&IdentifierKey::parse("doi:10.1/b").unwrap()], 0);
}

#[tokio::test]
async fn test_types_queried_separately_with_nested_ids() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .and(query_param("filter", "pmid:31452104"))
        .and(query_param("select", "ids,cited_by_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "ids": {"pmid": "https://pubmed.ncbi.nlm.nih.gov/31452104"},
                "cited_by_count": 3
            }],
            "meta": {"next_cursor": null}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .and(query_param("filter", "doi:10.1/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"doi": "https://doi.org/10.1/a", "cited_by_count": 9}],
            "meta": {"next_cursor": null}
        })))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);
    let ids = IdentifierYearMap::from([
        (IdentifierKey::parse("doi:10.1/a").unwrap(), 2020),
        (IdentifierKey::parse("pmid:31452104").unwrap(), 2019),
    ]);

    let citations = fetcher.fetch_citations(&ids).await.unwrap();

    assert_eq!(citations[&IdentifierKey::parse("doi:10.1/a").unwrap()], 9);
    assert_eq!(citations[&IdentifierKey::parse("pmid:31452104").unwrap()], 3);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn test_cursor_pagination_followed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .and(query_param("cursor", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"doi": "https://doi.org/10.1/a", "cited_by_count": 1},
                {"doi": "https://doi.org/10.1/zzz", "cited_by_count": 500}
            ],
            "meta": {"count": 3, "next_cursor": "page-2"}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .and(query_param("cursor", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"doi": "https://doi.org/10.1/b", "cited_by_count": 2}],
            "meta": {"count": 3, "next_cursor": "page-3"}
        })))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);
    let ids = IdentifierYearMap::from([
        (IdentifierKey::parse("doi:10.1/a").unwrap(), 2020),
        (IdentifierKey::parse("doi:10.1/b").unwrap(), 2020),
    ]);

    let citations = fetcher.fetch_citations(&ids).await.unwrap();

    assert_eq!(citations.len(), 2);
    assert_eq!(citations[&IdentifierKey::parse("doi:10.1/a").unwrap()], 1);
    assert_eq!(citations[&IdentifierKey::parse("doi:10.1/b").unwrap()], 2);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_full_page_reaching_count_is_last() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .and(query_param("cursor", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"doi": "https://doi.org/10.5555/w0000", "cited_by_count": 6}],
            "meta": {"count": 1, "next_cursor": "IlsxNjA5NDU5MjAwMDAwXSI="}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);

    let citations = fetcher.fetch_citations(&doi_map(1)).await.unwrap();

    assert_eq!(citations.values().copied().collect::<Vec<_>>(), vec![6]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_short_page_is_last() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"doi": "https://doi.org/10.5555/w0001", "cited_by_count": 2}],
            "meta": {"next_cursor": "more"}
        })))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);

    let citations = fetcher.fetch_citations(&doi_map(3)).await.unwrap();

    assert_eq!(citations.len(), 3);
    assert_eq!(citations.values().sum::<u64>(), 2);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_mailto_sent_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .and(query_param("mailto", "lab@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_page()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.mailto = Some("lab@example.org".to_string());
    let fetcher = setup_fetcher(&config);

    fetcher.fetch_citations(&doi_map(1)).await.unwrap();
}

// =============================================================================
// Retries and failures
// =============================================================================

#[tokio::test]
async fn test_retry_succeeds_after_transient_503() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"doi": "10.5555/w0000", "cited_by_count": 4}],
            "meta": {"next_cursor": null}
        })))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);

    let citations = fetcher.fetch_citations(&doi_map(1)).await.unwrap();

    assert_eq!(citations.values().copied().collect::<Vec<_>>(), vec![4]);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_exhausted_retries_fail_whole_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);

    let err = fetcher.fetch_citations(&doi_map(5)).await.unwrap_err();

    match err {
        MetricsError::CitationServiceUnavailable { id_type, source } => {
            assert_eq!(id_type, IdType::Doi);
            assert!(matches!(source, ClientError::RateLimited { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // One attempt plus `max_retries` retries.
    let attempts = mock_server.received_requests().await.unwrap().len();
    assert_eq!(attempts, 1 + config.max_retries as usize);
}

#[tokio::test]
async fn test_non_retryable_status_fails_fast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid filter"))
        .mount(&mock_server)
        .await;

    let config = Config::for_testing(&mock_server.uri());
    let fetcher = setup_fetcher(&config);

    let err = fetcher.fetch_citations(&doi_map(1)).await.unwrap_err();

    assert!(matches!(
        err,
        MetricsError::CitationServiceUnavailable { source: ClientError::BadRequest { .. }, .. }
    ));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sequential_bound_still_complete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(EchoDois)
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.max_concurrency = 1;
    let fetcher = setup_fetcher(&config);

    let citations = fetcher.fetch_citations(&doi_map(230)).await.unwrap();
    assert_eq!(citations.len(), 230);
    assert!(citations.values().all(|&c| c == 7));
}

#[tokio::test]
async fn test_in_flight_chunks_stay_within_bound() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(150);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("GET"))
        .and(path(WORKS_PATH))
        .respond_with(SlowEcho { delay, arrivals: arrivals.clone() })
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.max_concurrency = 3;
    let fetcher = setup_fetcher(&config);

    let citations = fetcher.fetch_citations(&doi_map(2_100)).await.unwrap();
    assert_eq!(citations.len(), 2_100);
    assert!(citations.values().all(|&c| c == 7));

    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 21);
    let peak = peak_overlap(&arrivals, delay);
    assert!(peak <= 3, "peak {peak}");
    assert!(peak >= 2, "chunks never overlapped");
}
