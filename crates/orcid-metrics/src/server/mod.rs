//! MCP server over stdio.

pub mod protocol;
pub mod stdio;

use std::sync::Arc;

use crate::pipeline::MetricsPipeline;
use crate::tools::{self, McpTool, ToolContext};

/// MCP server exposing the metrics pipeline as tools.
pub struct McpServer {
    /// Tool execution context.
    ctx: ToolContext,

    /// Registered tools.
    tools: Vec<Box<dyn McpTool>>,
}

impl McpServer {
    /// Create a new MCP server.
    #[must_use]
    pub fn new(pipeline: MetricsPipeline) -> Self {
        let ctx = ToolContext::new(Arc::new(pipeline));
        let tools = tools::register_all_tools();

        Self { ctx, tools }
    }

    /// Run the server in stdio mode.
    ///
    /// # Errors
    ///
    /// Returns error on I/O failure.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        tracing::info!(tools = self.tools.len(), "Starting MCP server in stdio mode");

        stdio::run_stdio(self.tools, self.ctx).await
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer").field("tools", &self.tools.len()).finish()
    }
}
