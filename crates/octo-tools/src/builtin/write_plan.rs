use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// Plan mode's only mutating sink: writes the proposed steps to the bound
/// plan file. The agent loop recognizes this tool by name and records a
/// `plan-written` history item rather than a generic `tool-output`.
pub struct WritePlanTool;

#[async_trait]
impl Tool for WritePlanTool {
    fn name(&self) -> &'static str {
        "write-plan"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "content": { "type": "string" } },
            "required": ["content"],
        })
    }

    fn is_mutating(&self) -> bool {
        false
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let content = require_str(&args, "content", "write-plan")?;
        let plan_path = ctx.plan_file_path.as_deref().ok_or_else(|| ToolError::Domain {
            message: "no plan file is bound for this session".to_string(),
        })?;
        let abs = ctx
            .transport
            .resolve_path(&ctx.abort, std::path::Path::new(plan_path))
            .await
            .map_err(|e| ToolError::Domain {
                message: e.to_string(),
            })?;
        ctx.tracker.write(&abs, content).await?;
        Ok(ToolOutcome::new(content.to_string()))
    }
}
