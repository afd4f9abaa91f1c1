//! Aggregation inputs and outputs: identifier maps, per-year series, metrics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::IdentifierKey;

/// Identifier key to publication year. Every year is positive.
pub type IdentifierYearMap = HashMap<IdentifierKey, i32>;

/// Years of works without a recognized identifier, in registry order.
pub type NoIdentifierYears = Vec<i32>;

/// Identifier key to citation count. Complete for every requested key after a fetch.
pub type CitationMap = HashMap<IdentifierKey, u64>;

/// Aligned per-year publication and citation counts.
///
/// `years` is strictly ascending; only years with at least one publication appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSeries {
    /// Years, ascending and unique.
    pub years: Vec<i32>,
    /// Publications per year.
    pub publications: Vec<u64>,
    /// Citations per year.
    pub citations: Vec<u64>,
}

impl YearSeries {
    /// Number of years in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// True when the researcher has no dated works.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// `(year, publications, citations)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (i32, u64, u64)> + '_ {
        self.years
            .iter()
            .zip(&self.publications)
            .zip(&self.citations)
            .map(|((&y, &p), &c)| (y, p, c))
    }
}

/// Scalar bibliometric indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    /// Dated works, with or without identifier.
    pub total_publications: u64,
    /// Citations summed over all works.
    pub total_citations: u64,
    /// Citations per work, 2 decimals.
    pub average_citations: f64,
    /// Citations per work over the last two calendar years, 2 decimals.
    pub impact_factor_2y: f64,
    /// h-index.
    pub h_index: u64,
    /// Works with at least 10 citations.
    pub i10_index: u64,
    /// Citations of the most cited work.
    pub most_cited_count: u64,
}

/// Series and metrics from a single registry read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// ORCID iD the report is for.
    pub orcid_id: String,
    /// Per-year series.
    #[serde(flatten)]
    pub series: YearSeries,
    /// Scalar metrics.
    #[serde(flatten)]
    pub metrics: MetricsResult,
}
