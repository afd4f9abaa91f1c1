//! Researcher-level indicators: metrics, yearly series and the combined report.

use serde_json::json;

use super::{McpTool, ToolContext, require_orcid};
use crate::error::ToolResult;
use crate::formatters;
use crate::models::{ResearcherInput, ResponseFormat};

fn researcher_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "orcidId": {
                "type": "string",
                "description": "ORCID iD, e.g. 0000-0002-1825-0097 or https://orcid.org/0000-0002-1825-0097"
            },
            "responseFormat": {
                "type": "string",
                "enum": ["markdown", "json"],
                "default": "markdown"
            }
        },
        "required": ["orcidId"]
    })
}

/// Scalar bibliometric indicators for one researcher.
pub struct ResearcherMetricsTool;

#[async_trait::async_trait]
impl McpTool for ResearcherMetricsTool {
    fn name(&self) -> &'static str {
        "researcher_metrics"
    }

    fn description(&self) -> &'static str {
        "Compute h-index, i10-index, total and average citations, 2-year impact factor \
         and most-cited count for an ORCID researcher, using OpenAlex citation counts."
    }

    fn input_schema(&self) -> serde_json::Value {
        researcher_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ResearcherInput = serde_json::from_value(input)?;
        require_orcid(&params.orcid_id)?;

        let metrics = ctx.pipeline.get_metrics(&params.orcid_id).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(format!(
                "# Metrics for {}\n\n{}",
                params.orcid_id.trim(),
                formatters::format_metrics_markdown(&metrics)
            )),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_metrics(&metrics))?)
            }
        }
    }
}

/// Publications and citations per year.
pub struct PublicationTimeSeriesTool;

#[async_trait::async_trait]
impl McpTool for PublicationTimeSeriesTool {
    fn name(&self) -> &'static str {
        "publication_timeseries"
    }

    fn description(&self) -> &'static str {
        "Per-year publication counts and citation counts for an ORCID researcher. \
         Years without publications are omitted."
    }

    fn input_schema(&self) -> serde_json::Value {
        researcher_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ResearcherInput = serde_json::from_value(input)?;
        require_orcid(&params.orcid_id)?;

        let series = ctx.pipeline.get_time_series(&params.orcid_id).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(format!(
                "# Publications per year for {}\n\n{}",
                params.orcid_id.trim(),
                formatters::format_series_markdown(&series)
            )),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_series(&series))?)
            }
        }
    }
}

/// Series and metrics from a single registry read.
pub struct ResearcherReportTool;

#[async_trait::async_trait]
impl McpTool for ResearcherReportTool {
    fn name(&self) -> &'static str {
        "researcher_report"
    }

    fn description(&self) -> &'static str {
        "Full bibliometric report for an ORCID researcher: yearly series plus all \
         indicators, computed from one consistent snapshot."
    }

    fn input_schema(&self) -> serde_json::Value {
        researcher_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ResearcherInput = serde_json::from_value(input)?;
        require_orcid(&params.orcid_id)?;

        let report = ctx.pipeline.get_report(&params.orcid_id).await?;

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_report_markdown(&report)),
            ResponseFormat::Json => {
                Ok(serde_json::to_string_pretty(&formatters::compact_report(&report))?)
            }
        }
    }
}
