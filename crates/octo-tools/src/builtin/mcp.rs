use async_trait::async_trait;
use octo_mcp::CallToolRequest;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// Proxies to a named MCP server's named sub-tool (§4.C, §6).
pub struct McpTool;

#[async_trait]
impl Tool for McpTool {
    fn name(&self) -> &'static str {
        "mcp"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "server": { "type": "string" },
                "tool": { "type": "string" },
                "arguments": { "type": "object" },
            },
            "required": ["server", "tool"],
        })
    }

    fn is_mutating(&self) -> bool {
        true
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let server = require_str(&args, "server", "mcp")?;
        let tool = require_str(&args, "tool", "mcp")?;
        let arguments = args.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let client = ctx.mcp_clients.get(server).ok_or_else(|| ToolError::Domain {
            message: format!("no MCP server named {server}"),
        })?;

        let result = client
            .call_tool(CallToolRequest {
                name: octo_mcp::sanitize_name(tool),
                arguments,
            })
            .await
            .map_err(|e| ToolError::Domain {
                message: e.to_string(),
            })?;

        let max_bytes = (ctx.context_window_tokens as usize).saturating_mul(4);
        let text = result.to_capped_text(max_bytes);
        if result.is_error {
            return Err(ToolError::Domain { message: text });
        }
        Ok(ToolOutcome::new(text))
    }
}
