//! Deduplication and pre-filtering of work lists.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{CitedWork, IdentifierKey, WorkRecord};

/// Anything that may carry a normalized identifier.
pub trait Identified {
    /// Key used for deduplication, if any.
    fn identifier_key(&self) -> Option<IdentifierKey>;
}

impl Identified for WorkRecord {
    fn identifier_key(&self) -> Option<IdentifierKey> {
        self.primary_identifier()
    }
}

impl Identified for CitedWork {
    fn identifier_key(&self) -> Option<IdentifierKey> {
        self.identifier.clone()
    }
}

/// Year and keyword restrictions applied before citations are attached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFilter {
    /// Keep only works published this year.
    pub year: Option<i32>,
    /// Keep only works whose title or description contains this (case-insensitive).
    pub keyword: Option<String>,
}

impl WorkFilter {
    /// Filter by year only.
    #[must_use]
    pub fn year(year: i32) -> Self {
        Self { year: Some(year), keyword: None }
    }

    /// Filter by keyword only.
    #[must_use]
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self { year: None, keyword: Some(keyword.into()) }
    }

    /// Apply both restrictions, year first.
    #[must_use]
    pub fn apply(&self, works: Vec<WorkRecord>) -> Vec<WorkRecord> {
        let works = match self.year {
            Some(year) => filter_by_year(works, year),
            None => works,
        };
        match self.keyword.as_deref().map(str::trim) {
            Some(keyword) if !keyword.is_empty() => filter_by_keyword(works, keyword),
            _ => works,
        }
    }
}

/// Keep the first work per identifier; unidentified works all pass through.
#[must_use]
pub fn dedupe<T: Identified>(works: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    works
        .into_iter()
        .filter(|work| work.identifier_key().is_none_or(|key| seen.insert(key)))
        .collect()
}

/// Works published in `year`.
#[must_use]
pub fn filter_by_year(works: Vec<WorkRecord>, year: i32) -> Vec<WorkRecord> {
    works.into_iter().filter(|w| w.publication_year == Some(year)).collect()
}

/// Works whose title or short description contains `keyword`.
#[must_use]
pub fn filter_by_keyword(works: Vec<WorkRecord>, keyword: &str) -> Vec<WorkRecord> {
    works.into_iter().filter(|w| w.matches_keyword(keyword)).collect()
}

/// Most cited first; ties keep their order.
pub fn sort_by_citations(works: &mut [CitedWork]) {
    works.sort_by(|a, b| b.cited_by_count.cmp(&a.cited_by_count));
}
