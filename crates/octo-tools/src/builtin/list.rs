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

/// Lists one directory's immediate entries.
pub struct ListTool;

#[async_trait]
impl Tool for ListTool {
    fn name(&self) -> &'static str {
        "list"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "path": { "type": "string", "description": "directory to list" } },
            "required": ["path"],
        })
    }

    fn is_mutating(&self) -> bool {
        false
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let path = require_str(&args, "path", "list")?;
        let abs = ctx
            .transport
            .resolve_path(&ctx.abort, Path::new(path))
            .await
            .map_err(|e| ToolError::Domain {
                message: e.to_string(),
            })?;
        if !ctx.transport.is_directory(&ctx.abort, &abs).await {
            return Err(ToolError::Domain {
                message: format!("{path} is not a directory"),
            });
        }
        let entries = ctx
            .transport
            .readdir(&ctx.abort, &abs)
            .await
            .map_err(|e| ToolError::Domain {
                message: e.to_string(),
            })?;
        let lines = entries.len() as i64;
        let content = entries
            .into_iter()
            .map(|e| if e.is_directory { format!("{}/", e.name) } else { e.name })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(ToolOutcome::with_lines(content, lines))
    }
}
