use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// Prepends text to the start of an already-read file.
pub struct PrependTool;

#[async_trait]
impl Tool for PrependTool {
    fn name(&self) -> &'static str {
        "prepend"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
                "content": { "type": "string" },
            },
            "required": ["path", "content"],
        })
    }

    fn is_mutating(&self) -> bool {
        true
    }

    async fn validate(&self, args: &Value, ctx: &ToolContext) -> Result<()> {
        let path = require_str(args, "path", "prepend")?;
        let abs = resolve(ctx, path).await?;
        ctx.tracker.assert_can_edit(&abs).await?;
        Ok(())
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let path = require_str(&args, "path", "prepend")?;
        let addition = require_str(&args, "content", "prepend")?;
        let abs = resolve(ctx, path).await?;
        let content = ctx.tracker.read(&abs).await?;
        let updated = format!("{addition}{content}");
        ctx.tracker.write(&abs, &updated).await?;
        Ok(ToolOutcome::new(format!("{path} was updated")))
    }
}

async fn resolve(ctx: &ToolContext, path: &str) -> Result<std::path::PathBuf> {
    ctx.transport
        .resolve_path(&ctx.abort, Path::new(path))
        .await
        .map_err(|e| ToolError::Domain {
            message: e.to_string(),
        })
}
