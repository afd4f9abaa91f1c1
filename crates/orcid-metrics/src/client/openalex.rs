//! OpenAlex works client.
//!
//! One call answers one chunk: a single `filter={type}:{v1|v2|…}` query.
//! `meta.next_cursor` is followed only while pages come back full and
//! `meta.count` has not been reached.

use super::{CitationIndex, HttpClient};
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{CitationPage, CitationRecord, IdType};

/// Citation counts from `GET {openalex}/works`.
#[derive(Debug, Clone)]
pub struct OpenAlexClient {
    http: HttpClient,
    base_url: String,
    mailto: Option<String>,
}

impl OpenAlexClient {
    /// Create a client sharing the given HTTP session.
    #[must_use]
    pub fn new(http: HttpClient, config: &Config) -> Self {
        Self {
            http,
            base_url: config.openalex_api_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
        }
    }

    fn works_url(&self) -> String {
        format!("{}/works", self.base_url)
    }

    fn params(&self, id_type: IdType, values: &[String], cursor: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("filter".to_string(), format!("{}:{}", filter_attribute(id_type), values.join("|"))),
            ("per-page".to_string(), values.len().max(1).to_string()),
            ("select".to_string(), select_fields(id_type).to_string()),
            ("cursor".to_string(), cursor.to_string()),
        ];
        if let Some(mailto) = &self.mailto {
            params.push(("mailto".to_string(), mailto.clone()));
        }
        params
    }
}

/// OpenAlex filter attribute for an identifier type.
const fn filter_attribute(id_type: IdType) -> &'static str {
    match id_type {
        IdType::Doi => "doi",
        IdType::Pmid => "pmid",
        IdType::Pmcid => "pmcid",
        IdType::Arxiv => "ids.arxiv",
    }
}

/// Only the identifier and the citation count come back.
const fn select_fields(id_type: IdType) -> &'static str {
    match id_type {
        IdType::Doi => "doi,cited_by_count",
        IdType::Pmid | IdType::Pmcid | IdType::Arxiv => "ids,cited_by_count",
    }
}

#[async_trait::async_trait]
impl CitationIndex for OpenAlexClient {
    async fn query_by_identifiers(
        &self,
        id_type: IdType,
        values: &[String],
    ) -> ClientResult<Vec<CitationRecord>> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.works_url();
        let mut records = Vec::new();
        let mut cursor = "*".to_string();
        let mut pages = 0_usize;

        loop {
            let page: CitationPage =
                self.http.get_json(&url, &self.params(id_type, values, &cursor)).await?;
            pages += 1;

            let next = page.next_cursor().map(str::to_string);
            let total = page.meta.as_ref().and_then(|meta| meta.count);
            let short_page = page.results.len() < values.len();
            records.extend(page.results);

            let exhausted = short_page || total.is_some_and(|count| records.len() as u64 >= count);
            match next {
                Some(next) if !exhausted && next != cursor => cursor = next,
                _ => break,
            }
        }

        tracing::debug!(
            id_type = %id_type,
            requested = values.len(),
            returned = records.len(),
            pages,
            "Citation chunk fetched"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(mailto: Option<&str>) -> OpenAlexClient {
        let mut config = Config::for_testing("http://localhost:1");
        config.mailto = mailto.map(str::to_string);
        OpenAlexClient::new(HttpClient::new(&config).unwrap(), &config)
    }

    #[test]
    fn test_params_join_values() {
        let values = vec!["10.1/a".to_string(), "10.1/b".to_string()];
        let params = client(None).params(IdType::Doi, &values, "*");
        assert!(params.contains(&("filter".to_string(), "doi:10.1/a|10.1/b".to_string())));
        assert!(params.contains(&("per-page".to_string(), "2".to_string())));
        assert!(params.contains(&("select".to_string(), "doi,cited_by_count".to_string())));
        assert!(params.contains(&("cursor".to_string(), "*".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "mailto"));
    }

    #[test]
    fn test_params_mailto_and_nested_select() {
        let params = client(Some("lab@example.org")).params(IdType::Pmid, &["1".to_string()], "c2");
        assert!(params.contains(&("mailto".to_string(), "lab@example.org".to_string())));
        assert!(params.contains(&("select".to_string(), "ids,cited_by_count".to_string())));
        assert!(params.contains(&("filter".to_string(), "pmid:1".to_string())));
    }
}
