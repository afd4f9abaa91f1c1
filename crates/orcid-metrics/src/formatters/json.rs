//! Compact JSON output.

use serde_json::{Value, json};

use crate::models::{CitedWork, MetricsReport, MetricsResult, WorkRecord, YearSeries};

/// Scalar metrics as a flat object.
#[must_use]
pub fn compact_metrics(metrics: &MetricsResult) -> Value {
    json!({
        "totalPublications": metrics.total_publications,
        "totalCitations": metrics.total_citations,
        "averageCitations": metrics.average_citations,
        "impactFactor2y": metrics.impact_factor_2y,
        "hIndex": metrics.h_index,
        "i10Index": metrics.i10_index,
        "mostCitedCount": metrics.most_cited_count,
    })
}

/// Aligned series arrays.
#[must_use]
pub fn compact_series(series: &YearSeries) -> Value {
    json!({
        "years": series.years,
        "publications": series.publications,
        "citations": series.citations,
    })
}

/// Report with the series and metrics side by side.
#[must_use]
pub fn compact_report(report: &MetricsReport) -> Value {
    json!({
        "orcidId": report.orcid_id,
        "series": compact_series(&report.series),
        "metrics": compact_metrics(&report.metrics),
    })
}

/// One work, with citations when known.
#[must_use]
pub fn compact_work(work: &WorkRecord, cited: Option<&CitedWork>) -> Value {
    let mut obj = json!({
        "title": work.title,
        "year": work.publication_year,
    });

    if let Some(doi) = work.doi() {
        obj["doi"] = json!(doi);
    }

    if let Some(kind) = &work.work_type {
        obj["type"] = json!(kind);
    }

    if let Some(container) = &work.container {
        obj["journal"] = json!(container);
    }

    if let Some(url) = &work.url {
        obj["url"] = json!(url);
    }

    if let Some(cited) = cited {
        obj["citations"] = json!(cited.cited_by_count);
        if let Some(key) = &cited.identifier {
            obj["identifier"] = json!(key.to_string());
        }
    }

    obj
}
