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

/// Reads a file through the tracker, which records its mtime so a later
/// `edit`/`create` can be checked against it (§4.B).
pub struct ReadTool;

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &'static str {
        "read"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "path": { "type": "string", "description": "path to the file to read" } },
            "required": ["path"],
        })
    }

    fn is_mutating(&self) -> bool {
        false
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let path = require_str(&args, "path", "read")?;
        let abs = ctx
            .transport
            .resolve_path(&ctx.abort, Path::new(path))
            .await
            .map_err(|e| ToolError::Domain {
                message: e.to_string(),
            })?;
        let content = ctx.tracker.read(&abs).await?;
        let lines = content.lines().count() as i64;
        Ok(ToolOutcome::with_lines(content, lines))
    }
}
