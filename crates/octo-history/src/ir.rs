/// Provider-neutral shape of a compiled history item. Each provider compiler
/// maps these 1:1 onto its wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum IrMessage {
    User {
        content: String,
    },
    Assistant {
        content: String,
        tool_call_id: Option<String>,
        tool_name: Option<String>,
        tool_arguments: Option<serde_json::Value>,
        provider_extras: Option<serde_json::Value>,
    },
    /// A successful tool result. `stub` is set when this is a deduplicated
    /// older file-read: the provider compiler renders it as a short stand-in
    /// instead of the real content.
    ToolOutput {
        tool_call_id: String,
        content: String,
        stub: bool,
    },
    /// A recoverable error the model should see and can react to.
    ToolError {
        tool_call_id: String,
        message: String,
    },
    /// Summary injected by compaction, framed as a prior user turn.
    CompactionCheckpoint {
        summary: String,
    },
}

/// The role an [`IrMessage`] plays on the wire; kept separate from the
/// message shape because some providers (Anthropic) fold tool-output and
/// tool-error into a `user`-role message with a `tool_result` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrRole {
    User,
    Assistant,
    Tool,
}

impl IrMessage {
    pub fn role(&self) -> IrRole {
        match self {
            IrMessage::User { .. } | IrMessage::CompactionCheckpoint { .. } => IrRole::User,
            IrMessage::Assistant { .. } => IrRole::Assistant,
            IrMessage::ToolOutput { .. } | IrMessage::ToolError { .. } => IrRole::Tool,
        }
    }
}
