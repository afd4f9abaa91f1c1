//! Markdown output formatting.

use crate::models::{CitedWork, MetricsReport, MetricsResult, WorkRecord, YearSeries};

/// Format scalar metrics as a Markdown table.
#[must_use]
pub fn format_metrics_markdown(metrics: &MetricsResult) -> String {
    let mut output = String::from("| Metric | Value |\n|---|---|\n");
    output.push_str(&format!("| Publications | {} |\n", metrics.total_publications));
    output.push_str(&format!("| Citations | {} |\n", metrics.total_citations));
    output.push_str(&format!("| Average citations | {:.2} |\n", metrics.average_citations));
    output.push_str(&format!("| Impact factor (2y) | {:.2} |\n", metrics.impact_factor_2y));
    output.push_str(&format!("| h-index | {} |\n", metrics.h_index));
    output.push_str(&format!("| i10-index | {} |\n", metrics.i10_index));
    output.push_str(&format!("| Most cited | {} |\n", metrics.most_cited_count));
    output
}

/// Format a year series as a Markdown table.
#[must_use]
pub fn format_series_markdown(series: &YearSeries) -> String {
    if series.is_empty() {
        return "No dated publications found.".to_string();
    }

    let mut output = String::from("| Year | Publications | Citations |\n|---|---|---|\n");
    for (year, publications, citations) in series.rows() {
        output.push_str(&format!("| {year} | {publications} | {citations} |\n"));
    }
    output
}

/// Format a full report.
#[must_use]
pub fn format_report_markdown(report: &MetricsReport) -> String {
    let mut output = format!("# Bibliometrics for {}\n\n", report.orcid_id);
    output.push_str("## Metrics\n\n");
    output.push_str(&format_metrics_markdown(&report.metrics));
    output.push_str("\n## Publications per year\n\n");
    output.push_str(&format_series_markdown(&report.series));
    output
}

/// Format works with their citation counts.
#[must_use]
pub fn format_works_markdown(works: &[CitedWork]) -> String {
    if works.is_empty() {
        return "No works found.".to_string();
    }

    let mut output = format!("# Works ({} results)\n\n", works.len());
    for (i, cited) in works.iter().enumerate() {
        output.push_str(&format_work_markdown(&cited.work, i + 1, Some(cited.cited_by_count)));
        output.push_str("\n---\n\n");
    }
    output
}

/// Format works without citation counts.
#[must_use]
pub fn format_records_markdown(works: &[WorkRecord]) -> String {
    if works.is_empty() {
        return "No works found.".to_string();
    }

    let mut output = format!("# Works ({} results)\n\n", works.len());
    for (i, work) in works.iter().enumerate() {
        output.push_str(&format_work_markdown(work, i + 1, None));
        output.push_str("\n---\n\n");
    }
    output
}

fn format_work_markdown(work: &WorkRecord, index: usize, citations: Option<u64>) -> String {
    let mut output = format!("## {}. {}\n\n", index, work.title);

    let mut meta = Vec::new();
    if let Some(year) = work.publication_year {
        meta.push(format!("**Year**: {year}"));
    }
    if let Some(citations) = citations {
        meta.push(format!("**Citations**: {citations}"));
    }
    if let Some(kind) = &work.work_type {
        meta.push(format!("**Type**: {kind}"));
    }
    if !meta.is_empty() {
        output.push_str(&format!("{}\n\n", meta.join(" | ")));
    }

    if let Some(container) = &work.container {
        output.push_str(&format!("**Journal**: {container}\n\n"));
    }

    if let Some(doi) = work.doi() {
        output.push_str(&format!("**Links**: [DOI](https://doi.org/{doi})\n"));
    } else if let Some(url) = &work.url {
        output.push_str(&format!("**Links**: [Record]({url})\n"));
    }

    output
}
