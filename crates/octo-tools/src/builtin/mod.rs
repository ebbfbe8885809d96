//! Built-in tools named in §6: `read, list, shell, edit, create, append,
//! prepend, rewrite, fetch, mcp, skill, write-plan, web-search, task`.

mod append;
mod create;
mod edit;
mod fetch;
mod list;
mod mcp;
mod prepend;
mod read;
mod rewrite;
mod shell;
mod skill;
mod task;
mod web_search;
mod write_plan;

pub use append::AppendTool;
pub use create::CreateTool;
pub use edit::EditTool;
pub use fetch::FetchTool;
pub use list::ListTool;
pub use mcp::McpTool;
pub use prepend::PrependTool;
pub use read::ReadTool;
pub use rewrite::RewriteTool;
pub use shell::ShellTool;
pub use skill::SkillTool;
pub use task::TaskTool;
pub use web_search::WebSearchTool;
pub use write_plan::WritePlanTool;
