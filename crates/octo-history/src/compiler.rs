use std::collections::HashSet;

use octo_protocol::HistoryItem;
use octo_protocol::SequenceId;

use crate::ir::IrMessage;

/// Compile a history slice into the provider-neutral IR.
///
/// Two rules matter here:
/// 1. **Terminal-read dedup** — walking in reverse, the most recent
///    `file-read` for a path keeps its full content; older reads of the
///    same path are rewritten to a short stub.
/// 2. **Error framing** — `tool-reject`, `tool-failed`, `tool-malformed`,
///    `file-outdated`, `file-unreadable` become `ToolError` IR nodes.
///
/// If a `compaction-checkpoint` is present, only it and everything after it
/// are visible (invariant: nothing with a smaller id survives compaction).
pub fn compile(items: &[HistoryItem]) -> Vec<IrMessage> {
    let start = items
        .iter()
        .rposition(|it| matches!(it, HistoryItem::CompactionCheckpoint { .. }))
        .unwrap_or(0);
    let visible = &items[start..];

    let stub_ids = dedup_older_file_reads(visible);

    visible
        .iter()
        .filter_map(|item| lower_one(item, &stub_ids))
        .collect()
}

/// Returns the set of `file-read` sequence ids that should be rendered as a
/// stub because a more recent read of the same path exists later in `items`.
fn dedup_older_file_reads(items: &[HistoryItem]) -> HashSet<SequenceId> {
    let mut seen_paths = HashSet::new();
    let mut stubs = HashSet::new();
    for item in items.iter().rev() {
        if let HistoryItem::FileRead { id, path, .. } = item {
            if !seen_paths.insert(path.clone()) {
                stubs.insert(*id);
            }
        }
    }
    stubs
}

fn lower_one(item: &HistoryItem, stub_ids: &HashSet<SequenceId>) -> Option<IrMessage> {
    match item {
        HistoryItem::User { content, .. } => Some(IrMessage::User {
            content: content.clone(),
        }),
        HistoryItem::Assistant {
            content,
            tool_call,
            provider_extras,
            ..
        } => Some(IrMessage::Assistant {
            content: content.clone(),
            tool_call_id: tool_call.as_ref().map(|tc| tc.tool_call_id.clone()),
            tool_name: tool_call.as_ref().map(|tc| tc.name.clone()),
            tool_arguments: tool_call.as_ref().map(|tc| tc.arguments.clone()),
            provider_extras: provider_extras.clone(),
        }),
        // The assistant item already carries the tool call; this is just a
        // dispatch marker and contributes nothing extra to the wire format.
        HistoryItem::Tool { .. } => None,
        HistoryItem::ToolOutput {
            tool_call, content, ..
        } => Some(IrMessage::ToolOutput {
            tool_call_id: tool_call.tool_call_id.clone(),
            content: content.clone(),
            stub: false,
        }),
        HistoryItem::FileRead {
            id,
            tool_call,
            content,
            ..
        } => {
            let stub = stub_ids.contains(id);
            Some(IrMessage::ToolOutput {
                tool_call_id: tool_call.tool_call_id.clone(),
                content: if stub {
                    "File was successfully read".to_string()
                } else {
                    content.clone()
                },
                stub,
            })
        }
        HistoryItem::FileMutate { tool_call, path, .. } => Some(IrMessage::ToolOutput {
            tool_call_id: tool_call.tool_call_id.clone(),
            content: format!("{path} was updated"),
            stub: false,
        }),
        HistoryItem::ToolReject { tool_call, .. } => Some(IrMessage::ToolError {
            tool_call_id: tool_call.tool_call_id.clone(),
            message: "The user rejected this tool call.".to_string(),
        }),
        HistoryItem::ToolFailed {
            tool_call_id,
            error,
            ..
        } => Some(IrMessage::ToolError {
            tool_call_id: tool_call_id.clone(),
            message: error.clone(),
        }),
        HistoryItem::ToolMalformed {
            tool_call_id,
            error,
            ..
        } => Some(IrMessage::ToolError {
            tool_call_id: tool_call_id.clone(),
            message: error.clone(),
        }),
        HistoryItem::FileOutdated {
            tool_call,
            error,
            path,
            ..
        } => Some(IrMessage::ToolError {
            tool_call_id: tool_call.tool_call_id.clone(),
            message: format!("{error} ({path} has been re-read into context)"),
        }),
        HistoryItem::FileUnreadable {
            tool_call, error, ..
        } => Some(IrMessage::ToolError {
            tool_call_id: tool_call.tool_call_id.clone(),
            message: error.clone(),
        }),
        HistoryItem::CompactionCheckpoint { summary, .. } => Some(IrMessage::CompactionCheckpoint {
            summary: summary.clone(),
        }),
        // Notifications are UI-only and plan artifacts are reflected in the
        // context space every turn; neither is sent to the model directly.
        HistoryItem::Notification { .. } | HistoryItem::PlanWritten { .. } => None,
    }
}
