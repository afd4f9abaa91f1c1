//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses and validates its input parameters
//! 2. Runs one [`MetricsPipeline`] operation
//! 3. Formats the result as Markdown or JSON

mod researcher;
mod works;

pub use researcher::*;
pub use works::*;

use std::sync::Arc;

use crate::error::{ToolError, ToolResult};
use crate::pipeline::MetricsPipeline;

/// Tool execution context.
pub struct ToolContext {
    /// Shared aggregation pipeline.
    pub pipeline: Arc<MetricsPipeline>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(pipeline: Arc<MetricsPipeline>) -> Self {
        Self { pipeline }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "researcher_metrics").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Researcher indicators (3)
        Box::new(researcher::ResearcherMetricsTool),
        Box::new(researcher::PublicationTimeSeriesTool),
        Box::new(researcher::ResearcherReportTool),
        // Work queries (3)
        Box::new(works::WorksWithCitationsTool),
        Box::new(works::WorksByCitationsTool),
        Box::new(works::FilterWorksTool),
    ]
}

/// Reject a blank ORCID iD before it reaches the pipeline.
fn require_orcid(orcid_id: &str) -> ToolResult<()> {
    if orcid_id.trim().is_empty() {
        return Err(ToolError::validation("orcidId", "cannot be empty"));
    }
    Ok(())
}
