//! Work listings: all works with citations, filtered and ranked works, plain filters.

use serde_json::json;

use super::{McpTool, ToolContext, require_orcid};
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{CitedWork, ResearcherInput, ResponseFormat, WorkQueryInput};
use crate::pipeline::WorkFilter;

fn query_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "orcidId": {
                "type": "string",
                "description": "ORCID iD, bare or as an orcid.org URL"
            },
            "year": {
                "type": "integer",
                "description": "Keep only works published this year"
            },
            "keyword": {
                "type": "string",
                "description": "Case-insensitive match on title or description"
            },
            "limit": {
                "type": "integer",
                "minimum": 1,
                "description": "Maximum works to return"
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

fn parse_query(input: serde_json::Value) -> ToolResult<(WorkQueryInput, WorkFilter)> {
    let params: WorkQueryInput = serde_json::from_value(input)?;
    require_orcid(&params.orcid_id)?;

    if params.limit == Some(0) {
        return Err(ToolError::validation("limit", "must be at least 1"));
    }
    if params.year.is_some_and(|y| y <= 0) {
        return Err(ToolError::validation("year", "must be a positive year"));
    }

    let filter = WorkFilter { year: params.year, keyword: params.keyword.clone() };
    Ok((params, filter))
}

fn render_cited(works: &[CitedWork], format: ResponseFormat) -> ToolResult<String> {
    match format {
        ResponseFormat::Markdown => Ok(formatters::format_works_markdown(works)),
        ResponseFormat::Json => {
            let compact: Vec<_> =
                works.iter().map(|w| formatters::compact_work(&w.work, Some(w))).collect();
            Ok(serde_json::to_string_pretty(&json!({ "total": works.len(), "works": compact }))?)
        }
    }
}

/// Every work of a researcher with its citation count, in registry order.
pub struct WorksWithCitationsTool;

#[async_trait::async_trait]
impl McpTool for WorksWithCitationsTool {
    fn name(&self) -> &'static str {
        "works_with_citations"
    }

    fn description(&self) -> &'static str {
        "List an ORCID researcher's works in registry order, each with its OpenAlex \
         citation count (0 when the work has no DOI, PMID, PMCID or arXiv id)."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "orcidId": {
                    "type": "string",
                    "description": "ORCID iD, bare or as an orcid.org URL"
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

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ResearcherInput = serde_json::from_value(input)?;
        require_orcid(&params.orcid_id)?;

        let works = ctx.pipeline.works_with_citations(&params.orcid_id).await?;
        render_cited(&works, params.response_format)
    }
}

/// Filtered works, identifier-deduplicated and ranked by citations.
pub struct WorksByCitationsTool;

#[async_trait::async_trait]
impl McpTool for WorksByCitationsTool {
    fn name(&self) -> &'static str {
        "works_by_citations"
    }

    fn description(&self) -> &'static str {
        "Rank an ORCID researcher's works by citation count, most cited first. \
         Optional year and keyword filters apply before ranking; duplicate \
         registry entries for the same identifier are counted once."
    }

    fn input_schema(&self) -> serde_json::Value {
        query_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let (params, filter) = parse_query(input)?;

        let mut works = ctx.pipeline.works_by_citations(&params.orcid_id, &filter).await?;
        if let Some(limit) = params.limit {
            works.truncate(limit);
        }

        render_cited(&works, params.response_format)
    }
}

/// Year and keyword filters without citation lookups.
pub struct FilterWorksTool;

#[async_trait::async_trait]
impl McpTool for FilterWorksTool {
    fn name(&self) -> &'static str {
        "filter_works"
    }

    fn description(&self) -> &'static str {
        "Filter an ORCID researcher's works by publication year and/or keyword. \
         Does not query citation counts."
    }

    fn input_schema(&self) -> serde_json::Value {
        query_schema()
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let (params, filter) = parse_query(input)?;

        let mut works = ctx.pipeline.filter_works(&params.orcid_id, &filter).await?;
        if let Some(limit) = params.limit {
            works.truncate(limit);
        }

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_records_markdown(&works)),
            ResponseFormat::Json => {
                let compact: Vec<_> =
                    works.iter().map(|w| formatters::compact_work(w, None)).collect();
                Ok(serde_json::to_string_pretty(
                    &json!({ "total": works.len(), "works": compact }),
                )?)
            }
        }
    }
}
