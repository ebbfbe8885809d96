use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// Only enabled when a search key is configured (§4.C).
pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web-search"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"],
        })
    }

    fn is_mutating(&self) -> bool {
        false
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let query = require_str(&args, "query", "web-search")?;
        let client = ctx.web_search_client.as_ref().ok_or_else(|| ToolError::Domain {
            message: "web search is not configured for this session".to_string(),
        })?;
        let results = client.search(query).await.map_err(|e| ToolError::Domain { message: e })?;
        let content = results
            .iter()
            .map(|r| format!("{}\n{}\n{}", r.title, r.url, r.snippet))
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ToolOutcome::with_lines(content, results.len() as i64))
    }
}
