//! Per-year folding of publications and citations.

use std::collections::BTreeMap;

use crate::models::{CitationMap, IdentifierYearMap, NoIdentifierYears, YearSeries};

/// Fold identified and unidentified works into an ascending per-year series.
///
/// Years with no publication are absent, never zero-filled.
#[must_use]
pub fn aggregate(
    ids: &IdentifierYearMap,
    no_ids: &NoIdentifierYears,
    citations: &CitationMap,
) -> YearSeries {
    let mut per_year: BTreeMap<i32, (u64, u64)> = BTreeMap::new();

    for (key, &year) in ids {
        let entry = per_year.entry(year).or_default();
        entry.0 += 1;
        entry.1 += citations.get(key).copied().unwrap_or(0);
    }
    for &year in no_ids {
        per_year.entry(year).or_default().0 += 1;
    }

    let mut series = YearSeries::default();
    for (year, (publications, cites)) in per_year {
        series.years.push(year);
        series.publications.push(publications);
        series.citations.push(cites);
    }
    series
}
