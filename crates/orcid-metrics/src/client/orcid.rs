//! ORCID public API client.

use super::{HttpClient, WorkRegistry};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::WorksPayload;

/// Reads a researcher's works from `GET {orcid_api}/{orcid}/works`.
#[derive(Debug, Clone)]
pub struct OrcidClient {
    http: HttpClient,
    base_url: String,
}

impl OrcidClient {
    /// Create a client sharing the given HTTP session.
    #[must_use]
    pub fn new(http: HttpClient, config: &Config) -> Self {
        Self { http, base_url: config.orcid_api_url.trim_end_matches('/').to_string() }
    }

    fn works_url(&self, orcid_id: &str) -> String {
        format!("{}/{orcid_id}/works", self.base_url)
    }
}

#[async_trait::async_trait]
impl WorkRegistry for OrcidClient {
    async fn fetch_works(&self, orcid_id: &str) -> ClientResult<Option<WorksPayload>> {
        let url = self.works_url(orcid_id);
        tracing::debug!(orcid = orcid_id, url = %url, "Fetching works");

        let payload: Option<WorksPayload> = self.http.get_json_cached(&url, &[]).await?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_works_url_trims_slash() {
        let mut config = Config::for_testing("http://localhost:1");
        config.orcid_api_url.push('/');
        let http = HttpClient::new(&config).unwrap();
        let client = OrcidClient::new(http, &config);
        assert_eq!(
            client.works_url("0000-0002-1825-0097"),
            "http://localhost:1/orcid/v3.0/0000-0002-1825-0097/works"
        );
    }
}
