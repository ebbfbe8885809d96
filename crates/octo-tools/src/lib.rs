//! Tool registry and dispatch (§4.C): a uniform contract every built-in
//! tool implements, per-mode confirmation policy, and the dispatch
//! algorithm that turns a model-requested [`ToolCall`] into a result or a
//! recoverable error.

mod error;
pub mod builtin;

pub use error::ToolError;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use octo_mcp::McpClient;
use octo_protocol::Mode;
use octo_protocol::ToolCall;
use octo_protocol::Transport;
use octo_tracker::FileTracker;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

type Result<T> = std::result::Result<T, ToolError>;

/// What a tool produced on success; mirrors `tool-output`'s shape (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub content: String,
    pub lines: Option<i64>,
}

impl ToolOutcome {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            lines: None,
        }
    }

    pub fn with_lines(content: impl Into<String>, lines: i64) -> Self {
        Self {
            content: content.into(),
            lines: Some(lines),
        }
    }
}

/// One hit from a [`WebSearchClient`] query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// External web-search provider; absent unless a key is configured (§4.C).
#[async_trait]
pub trait WebSearchClient: Send + Sync {
    async fn search(&self, query: &str) -> std::result::Result<Vec<WebSearchResult>, String>;
}

/// A spawned sub-agent's outcome, handed back by a [`TaskRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub summary: String,
}

/// Delegates a sub-task to a nested instance of the agent loop (§6, `task`
/// tool). Implemented by the loop crate; kept as a trait here so
/// `octo-tools` never depends back on `octo-loop`.
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run_task(&self, prompt: &str) -> std::result::Result<TaskResult, String>;
}

/// Shared state a tool run needs: the workspace transport, the file
/// tracker, the active mode, and any configured MCP clients.
#[derive(Clone)]
pub struct ToolContext {
    pub transport: Arc<dyn Transport>,
    pub tracker: Arc<FileTracker>,
    pub mode: Mode,
    pub mcp_clients: HashMap<String, Arc<dyn McpClient>>,
    /// Bound only in plan mode; `write-plan`'s sole valid target.
    pub plan_file_path: Option<String>,
    /// Context-window budget used by `fetch`/`mcp` to cap response size.
    pub context_window_tokens: u32,
    /// `None` unless a search key is configured.
    pub web_search_client: Option<Arc<dyn WebSearchClient>>,
    /// `None` unless the loop crate has wired up sub-agent delegation.
    pub task_runner: Option<Arc<dyn TaskRunner>>,
    /// Root directory `skill` discovers `.md` skill files under.
    pub skills_dir: Option<std::path::PathBuf>,
    /// The turn's abort signal (§4.C step 4: "run(args, ctx) under the
    /// turn's abort signal"); threaded into every transport call a tool
    /// makes so a mid-turn cancel actually stops in-flight I/O.
    pub abort: CancellationToken,
}

/// The uniform tool contract (§4.C): `{ name, argumentSchema, validate, run }`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    /// JSON schema for the tool's arguments, used both on the LLM wire and
    /// (rendered separately) as TypeScript-like text in the system prompt.
    fn schema(&self) -> Value;

    /// Whether this tool is subject to the mutating-tool confirmation policy.
    fn is_mutating(&self) -> bool;

    /// Domain-level checks beyond schema validity (file existence, tracker
    /// state, ...). Most tools accept anything that parses.
    async fn validate(&self, _args: &Value, _ctx: &ToolContext) -> Result<()> {
        Ok(())
    }

    async fn run(&self, args: Value, ctx: &ToolContext) -> Result<ToolOutcome>;
}

/// Confirmation policy (§4.C): which tools need a user prompt before running.
pub fn requires_confirmation(tool_name: &str, mode: Mode) -> bool {
    if !mode.requires_confirmation() {
        return false;
    }
    matches!(
        tool_name,
        "edit" | "create" | "append" | "prepend" | "rewrite" | "shell" | "mcp"
    )
}

const MUTATING_TOOLS: &[&str] = &["edit", "create", "append", "prepend", "rewrite"];

/// Looks tools up by name; rebuilt every turn since some tools are
/// conditional (MCP, skill, web-search, write-plan).
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tools.keys().copied()
    }
}

/// Outcome of dispatching a tool call, already shaped to match the history
/// items the agent loop will append (§3, §4.C step-by-step).
#[derive(Debug)]
pub enum DispatchOutcome {
    Output(ToolOutcome),
    /// Recoverable domain error → `tool-failed`.
    Failed(String),
    /// Missing tool or arguments that never parsed → `tool-malformed`.
    Malformed(String),
    /// On-disk mtime advanced past what the tracker last observed.
    FileOutdated { path: String, error: String },
    /// A previously-readable file could no longer be read.
    FileUnreadable { path: String, error: String },
    /// Plan mode's fixed response to any mutating tool.
    PlanModeBlocked,
}

/// Runs the dispatch algorithm in §4.C steps 1-4. Autofix (step 2's retry
/// on a parse failure) is the caller's responsibility: this function
/// assumes `call.arguments` is already the best JSON available, i.e. the
/// caller has already attempted JSON autofix if the raw string failed to
/// parse upstream of building the `ToolCall`.
///
/// `abort` is the turn's cancellation signal (§5); `ctx.abort` carries the
/// same token down into the tool's own transport calls, while `dispatch`
/// itself checks it once up front so a cancel that lands before a tool
/// even starts never runs it at all.
pub async fn dispatch(call: &ToolCall, registry: &ToolRegistry, ctx: &ToolContext, abort: &CancellationToken) -> DispatchOutcome {
    if abort.is_cancelled() {
        return DispatchOutcome::Failed("cancelled".to_string());
    }

    let Some(tool) = registry.get(&call.name) else {
        return DispatchOutcome::Malformed(format!("no tool named {}", call.name));
    };

    if ctx.mode.mutations_disabled() && MUTATING_TOOLS.contains(&tool.name()) {
        return DispatchOutcome::PlanModeBlocked;
    }

    if let Err(err) = tool.validate(&call.arguments, ctx).await {
        return classify_error(err);
    }

    match tool.run(call.arguments.clone(), ctx).await {
        Ok(outcome) => DispatchOutcome::Output(outcome),
        Err(err) => classify_error(err),
    }
}

fn classify_error(err: ToolError) -> DispatchOutcome {
    match err {
        ToolError::NotFound { name } => DispatchOutcome::Malformed(format!("no tool named {name}")),
        ToolError::Malformed { reason, .. } => DispatchOutcome::Malformed(reason),
        ToolError::FileOutdated { path, reason } => DispatchOutcome::FileOutdated {
            path,
            error: reason,
        },
        ToolError::FileUnreadable { path, reason } => DispatchOutcome::FileUnreadable {
            path,
            error: reason,
        },
        ToolError::FileExists { path } => DispatchOutcome::Failed(format!("{path} already exists")),
        ToolError::Domain { message } => DispatchOutcome::Failed(message),
        ToolError::PlanModeBlocked => DispatchOutcome::PlanModeBlocked,
    }
}

pub(crate) fn require_str<'a>(args: &'a Value, field: &str, tool: &str) -> Result<&'a str> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::Malformed {
            tool_name: tool.to_string(),
            reason: format!("missing required string field `{field}`"),
        })
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
