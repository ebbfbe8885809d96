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

/// Exact-match search/replace. A search string that doesn't occur is a
/// domain error; the agent loop may retry once through the diff autofixer
/// (§4.I) before giving up.
pub struct EditTool;

#[async_trait]
impl Tool for EditTool {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
                "search": { "type": "string" },
                "replace": { "type": "string" },
            },
            "required": ["path", "search", "replace"],
        })
    }

    fn is_mutating(&self) -> bool {
        true
    }

    async fn validate(&self, args: &Value, ctx: &ToolContext) -> Result<()> {
        let path = require_str(args, "path", "edit")?;
        let abs = resolve(ctx, path).await?;
        ctx.tracker.assert_can_edit(&abs).await?;
        Ok(())
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let path = require_str(&args, "path", "edit")?;
        let search = require_str(&args, "search", "edit")?;
        let replace = require_str(&args, "replace", "edit")?;
        let abs = resolve(ctx, path).await?;

        let content = ctx.tracker.read(&abs).await?;
        let Some(pos) = content.find(search) else {
            return Err(ToolError::Domain {
                message: format!("search text not found in {path}"),
            });
        };
        let mut updated = String::with_capacity(content.len());
        updated.push_str(&content[..pos]);
        updated.push_str(replace);
        updated.push_str(&content[pos + search.len()..]);

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
