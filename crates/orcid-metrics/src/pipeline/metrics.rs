//! Scalar indicators derived from a year series and raw citation counts.

use chrono::Datelike;

use crate::models::{CitationMap, IdentifierYearMap, MetricsResult, NoIdentifierYears, YearSeries};

/// Compute metrics relative to the current calendar year (UTC).
#[must_use]
pub fn compute(
    series: &YearSeries,
    ids: &IdentifierYearMap,
    no_ids: &NoIdentifierYears,
    citations: &CitationMap,
) -> MetricsResult {
    compute_at(series, ids, no_ids, citations, chrono::Utc::now().year())
}

/// Compute metrics as of `current_year`.
///
/// The candidate list for h, i10 and most-cited is one count per identified
/// work plus a zero per unidentified work.
#[must_use]
pub fn compute_at(
    series: &YearSeries,
    ids: &IdentifierYearMap,
    no_ids: &NoIdentifierYears,
    citations: &CitationMap,
    current_year: i32,
) -> MetricsResult {
    let total_publications: u64 = series.publications.iter().sum();
    let total_citations: u64 = series.citations.iter().sum();

    let cutoff = current_year - 2;
    let (recent_publications, recent_citations) = series
        .rows()
        .filter(|(year, _, _)| *year >= cutoff)
        .fold((0_u64, 0_u64), |(p, c), (_, pubs, cites)| (p + pubs, c + cites));

    let mut counts: Vec<u64> = ids
        .keys()
        .map(|key| citations.get(key).copied().unwrap_or(0))
        .chain(std::iter::repeat_n(0, no_ids.len()))
        .collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    MetricsResult {
        total_publications,
        total_citations,
        average_citations: ratio(total_citations, total_publications),
        impact_factor_2y: ratio(recent_citations, recent_publications),
        h_index: h_index(&counts),
        i10_index: i10_index(&counts),
        most_cited_count: counts.first().copied().unwrap_or(0),
    }
}

/// Largest `h` such that the `h`-th value of a descending list is at least `h`.
#[must_use]
pub fn h_index(sorted_desc: &[u64]) -> u64 {
    sorted_desc.iter().zip(1_u64..).take_while(|&(&count, rank)| count >= rank).count() as u64
}

/// Values of at least 10.
#[must_use]
pub fn i10_index(counts: &[u64]) -> u64 {
    counts.iter().filter(|&&c| c >= 10).count() as u64
}

/// Round to 2 decimals, halves away from zero.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(numerator as f64 / denominator as f64)
}
