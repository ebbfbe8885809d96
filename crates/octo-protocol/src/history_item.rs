use serde::Deserialize;
use serde::Serialize;

use crate::SequenceId;
use crate::TokenUsage;
use crate::ToolCall;

/// One entry in the append-only session log.
///
/// Every variant carries the [`SequenceId`] it was appended under
/// (invariant: strictly increasing in append order). Match exhaustively;
/// there is no catch-all variant by design.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HistoryItem {
    /// The raw user prompt. `images` carries inline data-URL attachments.
    User {
        id: SequenceId,
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        images: Vec<String>,
    },

    /// A model turn. `tool_call` is present iff the turn ended by invoking a tool.
    Assistant {
        id: SequenceId,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reasoning_content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_call: Option<ToolCall>,
        token_usage: TokenUsage,
        output_tokens: i64,
        /// Opaque provider-specific state (e.g. signed thinking blocks) that
        /// must round-trip back to the provider verbatim.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        provider_extras: Option<serde_json::Value>,
    },

    /// Record that a tool was dispatched.
    Tool { id: SequenceId, tool_call: ToolCall },

    /// Successful tool result (not a file read/mutate, which are distinguished below).
    ToolOutput {
        id: SequenceId,
        tool_call: ToolCall,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lines: Option<i64>,
    },

    /// Successful file read, distinguished so repeats may be deduplicated.
    FileRead {
        id: SequenceId,
        tool_call: ToolCall,
        path: String,
        content: String,
    },

    /// Successful write/edit/create. Reported to the model as "X was updated".
    FileMutate {
        id: SequenceId,
        tool_call: ToolCall,
        path: String,
    },

    /// The user refused the call.
    ToolReject { id: SequenceId, tool_call: ToolCall },

    /// The tool raised a domain error.
    ToolFailed {
        id: SequenceId,
        tool_call_id: String,
        tool_name: String,
        error: String,
    },

    /// Arguments failed schema validation even after autofix.
    ToolMalformed {
        id: SequenceId,
        tool_call_id: String,
        tool_name: String,
        arguments: String,
        error: String,
    },

    /// Write rejected because on-disk mtime is newer than last observed.
    FileOutdated {
        id: SequenceId,
        tool_call: ToolCall,
        path: String,
        error: String,
    },

    /// Read failed on a path the tracker previously considered readable.
    FileUnreadable {
        id: SequenceId,
        tool_call: ToolCall,
        path: String,
        error: String,
    },

    /// Replaces all prior items; see history compaction.
    CompactionCheckpoint { id: SequenceId, summary: String },

    /// System-generated human-visible notice, never sent to the model.
    Notification { id: SequenceId, content: String },

    /// Plan-mode artifact written by the `write-plan` tool.
    PlanWritten {
        id: SequenceId,
        plan_file_path: String,
        content: String,
    },
}

impl HistoryItem {
    /// The sequence id every variant carries.
    pub fn id(&self) -> SequenceId {
        match self {
            HistoryItem::User { id, .. }
            | HistoryItem::Assistant { id, .. }
            | HistoryItem::Tool { id, .. }
            | HistoryItem::ToolOutput { id, .. }
            | HistoryItem::FileRead { id, .. }
            | HistoryItem::FileMutate { id, .. }
            | HistoryItem::ToolReject { id, .. }
            | HistoryItem::ToolFailed { id, .. }
            | HistoryItem::ToolMalformed { id, .. }
            | HistoryItem::FileOutdated { id, .. }
            | HistoryItem::FileUnreadable { id, .. }
            | HistoryItem::CompactionCheckpoint { id, .. }
            | HistoryItem::Notification { id, .. }
            | HistoryItem::PlanWritten { id, .. } => *id,
        }
    }

    /// The tool-call id this item correlates to, if any.
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            HistoryItem::Tool { tool_call, .. }
            | HistoryItem::ToolOutput { tool_call, .. }
            | HistoryItem::FileRead { tool_call, .. }
            | HistoryItem::FileMutate { tool_call, .. }
            | HistoryItem::ToolReject { tool_call, .. }
            | HistoryItem::FileOutdated { tool_call, .. }
            | HistoryItem::FileUnreadable { tool_call, .. } => Some(&tool_call.tool_call_id),
            HistoryItem::ToolFailed { tool_call_id, .. }
            | HistoryItem::ToolMalformed { tool_call_id, .. } => Some(tool_call_id),
            HistoryItem::Assistant {
                tool_call: Some(tc),
                ..
            } => Some(&tc.tool_call_id),
            _ => None,
        }
    }

    /// Whether this item is ever shown to the model (notifications are UI-only).
    pub fn is_model_visible(&self) -> bool {
        !matches!(self, HistoryItem::Notification { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_is_not_model_visible() {
        let item = HistoryItem::Notification {
            id: SequenceId::from_raw(0),
            content: "hi".into(),
        };
        assert!(!item.is_model_visible());
    }

    #[test]
    fn serde_round_trip_preserves_tag() {
        let item = HistoryItem::User {
            id: SequenceId::from_raw(3),
            content: "hello".into(),
            images: vec![],
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"user\""));
        let back: HistoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), item.id());
    }
}
