//! Stdio transport for MCP protocol.
//!
//! Handles newline-delimited JSON-RPC 2.0 over stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::protocol::{
    INVALID_PARAMS, JsonRpcRequest, JsonRpcResponse, METHOD_NOT_FOUND, McpToolInfo, PARSE_ERROR,
    TOOL_ERROR,
};
use crate::tools::{McpTool, ToolContext};

/// Handle MCP protocol over the process stdin/stdout.
pub async fn run_stdio(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> anyhow::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    let writer = tokio::io::stdout();
    serve(reader, writer, &tools, &ctx).await
}

/// Serve requests from `reader` until EOF, writing one response line per request.
pub async fn serve<R, W>(
    mut reader: R,
    mut writer: W,
    tools: &[Box<dyn McpTool>],
    ctx: &ToolContext,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    tracing::info!("MCP stdio server ready, waiting for requests");

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) if request.is_notification() => {
                tracing::debug!(method = %request.method, "Notification");
                continue;
            }
            Ok(request) => {
                tracing::debug!(method = %request.method, "Received request");
                handle_request(&request, tools, ctx).await
            }
            Err(e) => JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {e}")),
        };

        let response_json = serde_json::to_string(&response)?;
        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

async fn handle_request(
    req: &JsonRpcRequest,
    tools: &[Box<dyn McpTool>],
    ctx: &ToolContext,
) -> JsonRpcResponse {
    match req.method.as_str() {
        "initialize" => handle_initialize(req.id.clone(), &req.params),
        "initialized" | "ping" => JsonRpcResponse::success(req.id.clone(), serde_json::json!({})),
        "tools/list" => handle_tools_list(req.id.clone(), tools),
        "tools/call" => handle_tools_call(req.id.clone(), &req.params, tools, ctx).await,
        _ => JsonRpcResponse::error(
            req.id.clone(),
            METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    }
}

fn handle_initialize(id: Option<serde_json::Value>, params: &serde_json::Value) -> JsonRpcResponse {
    let protocol_version =
        params.get("protocolVersion").and_then(|v| v.as_str()).unwrap_or("2024-11-05");

    tracing::info!(protocol_version, "MCP initialize");

    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "orcid-metrics",
                "version": env!("CARGO_PKG_VERSION")
            }
        }),
    )
}

fn handle_tools_list(id: Option<serde_json::Value>, tools: &[Box<dyn McpTool>]) -> JsonRpcResponse {
    let tool_list: Vec<McpToolInfo> = tools
        .iter()
        .map(|t| McpToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.input_schema(),
        })
        .collect();

    JsonRpcResponse::success(id, serde_json::json!({ "tools": tool_list }))
}

async fn handle_tools_call(
    id: Option<serde_json::Value>,
    params: &serde_json::Value,
    tools: &[Box<dyn McpTool>],
    ctx: &ToolContext,
) -> JsonRpcResponse {
    let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing 'name' parameter");
    };

    let arguments = params.get("arguments").cloned().unwrap_or_else(|| serde_json::json!({}));

    let Some(tool) = tools.iter().find(|t| t.name() == tool_name) else {
        return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Tool not found: {tool_name}"));
    };

    tracing::info!(tool = %tool_name, "Executing tool");

    match tool.execute(ctx, arguments).await {
        Ok(result) => JsonRpcResponse::success(
            id,
            serde_json::json!({
                "content": [{
                    "type": "text",
                    "text": result
                }]
            }),
        ),
        Err(e) => {
            tracing::error!(tool = %tool_name, error = %e, "Tool execution failed");
            JsonRpcResponse::error(id, TOOL_ERROR, e.to_user_message())
        }
    }
}
