use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// Runs a non-interactive subshell with a caller-supplied timeout (§4.C).
pub struct ShellTool;

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cmd": { "type": "string" },
                "timeoutMs": { "type": "integer", "description": "timeout in milliseconds" },
            },
            "required": ["cmd", "timeoutMs"],
        })
    }

    fn is_mutating(&self) -> bool {
        true
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let cmd = require_str(&args, "cmd", "shell")?;
        let timeout_ms = args
            .get("timeoutMs")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| ToolError::Malformed {
                tool_name: "shell".to_string(),
                reason: "missing required integer field `timeoutMs`".to_string(),
            })?;
        let result = ctx
            .transport
            .shell(&ctx.abort, cmd, timeout_ms)
            .await
            .map_err(|e| ToolError::Domain {
                message: e.to_string(),
            })?;
        if result.exit_code != 0 {
            return Err(ToolError::Domain {
                message: format!(
                    "Command exited with code {}\noutput: {}",
                    result.exit_code, result.output
                ),
            });
        }
        Ok(ToolOutcome::new(result.output))
    }
}
