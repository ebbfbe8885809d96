use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::Result;
use crate::Tool;
use crate::ToolContext;
use crate::ToolError;
use crate::ToolOutcome;
use crate::require_str;

/// Only enabled when skills are discoverable under a skills directory
/// (§4.C). Loads a named skill's markdown body verbatim; the model then
/// follows it in place of its default approach.
pub struct SkillTool;

#[async_trait]
impl Tool for SkillTool {
    fn name(&self) -> &'static str {
        "skill"
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "required": ["name"],
        })
    }

    fn is_mutating(&self) -> bool {
        false
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome> {
        let name = require_str(&args, "name", "skill")?;
        let dir = ctx.skills_dir.as_ref().ok_or_else(|| ToolError::Domain {
            message: "no skills directory is configured for this session".to_string(),
        })?;
        let path = dir.join(format!("{name}.md"));
        let content = ctx.tracker.read(&path).await.map_err(|_| ToolError::Domain {
            message: format!("no skill named {name}"),
        })?;
        Ok(ToolOutcome::new(content))
    }
}
