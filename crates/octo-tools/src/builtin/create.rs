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

/// Creates a new file; fails with `FileExists` if the path already exists.
pub struct CreateTool;

#[async_trait]
impl Tool for CreateTool {
    fn name(&self) -> &'static str {
        "create"
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
        let path = require_str(args, "path", "create")?;
        let abs = resolve(ctx, path).await?;
        ctx.tracker.assert_can_create(&abs).await?;
        Ok(())
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let path = require_str(&args, "path", "create")?;
        let content = require_str(&args, "content", "create")?;
        let abs = resolve(ctx, path).await?;
        ctx.tracker.write(&abs, content).await?;
        Ok(ToolOutcome::new(format!("{path} was created")))
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
