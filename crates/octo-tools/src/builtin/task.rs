use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// Delegates a bounded sub-task to a nested agent loop run, returning its
/// summary rather than a full transcript.
pub struct TaskTool;

#[async_trait]
impl Tool for TaskTool {
    fn name(&self) -> &'static str {
        "task"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "prompt": { "type": "string" } },
            "required": ["prompt"],
        })
    }

    fn is_mutating(&self) -> bool {
        false
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let prompt = require_str(&args, "prompt", "task")?;
        let runner = ctx.task_runner.as_ref().ok_or_else(|| ToolError::Domain {
            message: "sub-agent delegation is not available in this session".to_string(),
        })?;
        let result = runner
            .run_task(prompt)
            .await
            .map_err(|e| ToolError::Domain { message: e })?;
        Ok(ToolOutcome::new(result.summary))
    }
}
