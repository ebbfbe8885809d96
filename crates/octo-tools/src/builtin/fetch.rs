use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// HTTP GET with optional HTML→text conversion, capped at the model's
/// context window (§4.C).
pub struct FetchTool;

#[async_trait]
impl Tool for FetchTool {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string" },
                "asText": { "type": "boolean", "description": "convert HTML to plain text" },
            },
            "required": ["url"],
        })
    }

    fn is_mutating(&self) -> bool {
        false
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let url = require_str(&args, "url", "fetch")?;
        let as_text = args.get("asText").and_then(|v| v.as_bool()).unwrap_or(true);

        let response = tokio::select! {
            biased;
            _ = ctx.abort.cancelled() => {
                return Err(ToolError::Domain { message: "fetch cancelled".to_string() });
            }
            result = reqwest::get(url) => result.map_err(|e| ToolError::Domain {
                message: format!("fetch failed: {e}"),
            })?,
        };

        if response.status().as_u16() == 403 {
            return Err(ToolError::Domain {
                message: format!(
                    "{url} returned 403 Forbidden; this site likely blocks automated fetches and needs human assistance"
                ),
            });
        }
        if !response.status().is_success() {
            return Err(ToolError::Domain {
                message: format!("{url} returned HTTP {}", response.status().as_u16()),
            });
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/html"))
            .unwrap_or(false);

        let body = response.text().await.map_err(|e| ToolError::Domain {
            message: format!("fetch failed: {e}"),
        })?;

        let rendered = if is_html && as_text {
            html2text::from_read(body.as_bytes(), 120)
        } else {
            body
        };

        let max_bytes = (ctx.context_window_tokens as usize).saturating_mul(4);
        let capped = if rendered.len() > max_bytes {
            let mut truncated: String = rendered.chars().take(max_bytes).collect();
            truncated.push_str("\n...[truncated]");
            truncated
        } else {
            rendered
        };
        Ok(ToolOutcome::new(capped))
    }
}
