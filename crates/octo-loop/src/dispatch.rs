use std::path::Path;

use async_trait::async_trait;
use octo_history::History;
use octo_protocol::HistoryItem;
use octo_protocol::ToolCall;
use octo_tools::DispatchOutcome;
use octo_tools::ToolContext;
use octo_tools::ToolRegistry;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

const FILE_MUTATING_TOOLS: &[&str] = &["create", "edit", "append", "prepend", "rewrite"];

/// Proposes a corrected `search` string for a failed diff edit, given the
/// original file content. Invoked at most once per edit (§4.I).
#[async_trait]
pub trait DiffAutofixer: Send + Sync {
    async fn fix_search(&self, file_content: &str, search: &str, replace: &str) -> Option<String>;
}

/// Runs the dispatch algorithm (via `octo_tools::dispatch`) and appends the
/// history item its outcome maps to (§3, §4.C). On a failed `edit` whose
/// search text wasn't found, retries once through `diff_autofixer` before
/// giving up (§4.I).
pub async fn dispatch_and_record(
    history: &mut History,
    call: &ToolCall,
    registry: &ToolRegistry,
    ctx: &ToolContext,
    diff_autofixer: Option<&dyn DiffAutofixer>,
    abort: &CancellationToken,
) {
    let outcome = octo_tools::dispatch(call, registry, ctx, abort).await;

    let outcome = match &outcome {
        DispatchOutcome::Failed(message) if call.name == "edit" && message.contains("search text not found") => {
            match try_diff_autofix(call, ctx, diff_autofixer).await {
                Some(retry_call) => octo_tools::dispatch(&retry_call, registry, ctx, abort).await,
                None => outcome,
            }
        }
        _ => outcome,
    };

    append_outcome(history, call, outcome, ctx.plan_file_path.as_deref());
}

async fn try_diff_autofix(
    call: &ToolCall,
    ctx: &ToolContext,
    diff_autofixer: Option<&dyn DiffAutofixer>,
) -> Option<ToolCall> {
    let autofixer = diff_autofixer?;
    let path = call.arguments.get("path")?.as_str()?;
    let abs = ctx.transport.resolve_path(&ctx.abort, Path::new(path)).await.ok()?;
    let content = ctx.tracker.read(&abs).await.ok()?;
    let search = call.arguments.get("search")?.as_str()?;
    let replace = call.arguments.get("replace")?.as_str()?;
    let fixed_search = autofixer.fix_search(&content, search, replace).await?;

    let mut fixed_args = call.arguments.clone();
    fixed_args["search"] = Value::String(fixed_search);
    Some(ToolCall::new(call.tool_call_id.clone(), call.name.clone(), fixed_args))
}

/// The user declined a confirmation prompt (§3 `tool-reject`); dispatch was
/// never attempted.
pub fn record_tool_reject(history: &mut History, call: &ToolCall) {
    history.append(HistoryItem::ToolReject {
        id: history.next_id(),
        tool_call: call.clone(),
    });
}

fn append_outcome(history: &mut History, call: &ToolCall, outcome: DispatchOutcome, plan_file_path: Option<&str>) {
    match outcome {
        DispatchOutcome::Output(out) => append_success(history, call, out, plan_file_path),
        DispatchOutcome::Failed(message) => history.append(HistoryItem::ToolFailed {
            id: history.next_id(),
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.name.clone(),
            error: message,
        }),
        DispatchOutcome::Malformed(message) => history.append(HistoryItem::ToolMalformed {
            id: history.next_id(),
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.name.clone(),
            arguments: call.arguments.to_string(),
            error: message,
        }),
        DispatchOutcome::FileOutdated { path, error } => history.append(HistoryItem::FileOutdated {
            id: history.next_id(),
            tool_call: call.clone(),
            path,
            error,
        }),
        DispatchOutcome::FileUnreadable { path, error } => history.append(HistoryItem::FileUnreadable {
            id: history.next_id(),
            tool_call: call.clone(),
            path,
            error,
        }),
        DispatchOutcome::PlanModeBlocked => history.append(HistoryItem::ToolFailed {
            id: history.next_id(),
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.name.clone(),
            error: "mutating tools are disabled in plan mode".to_string(),
        }),
    }
}

fn append_success(history: &mut History, call: &ToolCall, out: octo_tools::ToolOutcome, plan_file_path: Option<&str>) {
    match call.name.as_str() {
        "read" => {
            let path = call.arguments.get("path").and_then(|v| v.as_str()).unwrap_or_default();
            history.append(HistoryItem::FileRead {
                id: history.next_id(),
                tool_call: call.clone(),
                path: path.to_string(),
                content: out.content,
            });
        }
        name if FILE_MUTATING_TOOLS.contains(&name) => {
            let path = call.arguments.get("path").and_then(|v| v.as_str()).unwrap_or_default();
            history.append(HistoryItem::FileMutate {
                id: history.next_id(),
                tool_call: call.clone(),
                path: path.to_string(),
            });
        }
        "write-plan" => {
            history.append(HistoryItem::PlanWritten {
                id: history.next_id(),
                plan_file_path: plan_file_path.unwrap_or_default().to_string(),
                content: out.content,
            });
        }
        _ => {
            history.append(HistoryItem::ToolOutput {
                id: history.next_id(),
                tool_call: call.clone(),
                content: out.content,
                lines: out.lines,
            });
        }
    }
}

#[cfg(test)]
#[path = "dispatch.test.rs"]
mod tests;
