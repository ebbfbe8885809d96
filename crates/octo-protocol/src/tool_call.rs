use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Correlates an assistant's request to invoke a tool with its eventual result.
///
/// `tool_call_id` is assigned by the provider and is opaque to the core;
/// it is only ever compared for equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_call_id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(tool_call_id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            arguments,
        }
    }
}
