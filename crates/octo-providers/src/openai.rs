//! OpenAI-compatible chat completions: `assistant.tool_calls[]`, tool
//! messages correlated by id, JSON arguments serialized as a string.

use octo_history::IrMessage;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ProviderCompiler;
use crate::ReasoningEffort;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum OpenAiMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<OpenAiToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: OpenAiFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiFunctionCall {
    pub name: String,
    /// JSON-encoded argument object; OpenAI wants this as a string, not a nested object.
    pub arguments: String,
}

/// Request-level knobs the agent loop sets on every stream (§6).
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequestOptions {
    pub stream: bool,
    pub stream_options_include_usage: bool,
    /// Parallel tool use is always disabled at the wire (§9 open question a).
    pub parallel_tool_calls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl Default for OpenAiRequestOptions {
    fn default() -> Self {
        Self {
            stream: true,
            stream_options_include_usage: true,
            parallel_tool_calls: false,
            reasoning_effort: None,
        }
    }
}

/// Compiles IR into the OpenAI-compatible message array.
pub struct OpenAiCompiler {
    pub system_prompt: String,
}

impl ProviderCompiler for OpenAiCompiler {
    type WireMessage = OpenAiMessage;

    fn encode(&self, messages: &[IrMessage]) -> Vec<OpenAiMessage> {
        let mut wire = vec![OpenAiMessage::System {
            content: self.system_prompt.clone(),
        }];
        for msg in messages {
            wire.push(encode_one(msg));
        }
        wire
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

fn encode_one(msg: &IrMessage) -> OpenAiMessage {
    match msg {
        IrMessage::User { content } => OpenAiMessage::User {
            content: content.clone(),
        },
        IrMessage::CompactionCheckpoint { summary } => OpenAiMessage::User {
            content: format!("<summary>\n{summary}\n</summary>"),
        },
        IrMessage::Assistant {
            content,
            tool_call_id,
            tool_name,
            tool_arguments,
            ..
        } => {
            let tool_calls = match (tool_call_id, tool_name, tool_arguments) {
                (Some(id), Some(name), Some(args)) => vec![OpenAiToolCall {
                    id: id.clone(),
                    kind: "function".to_string(),
                    function: OpenAiFunctionCall {
                        name: name.clone(),
                        arguments: arguments_to_string(args),
                    },
                }],
                _ => vec![],
            };
            OpenAiMessage::Assistant {
                content: content.clone(),
                tool_calls,
            }
        }
        IrMessage::ToolOutput {
            tool_call_id,
            content,
            ..
        } => OpenAiMessage::Tool {
            tool_call_id: tool_call_id.clone(),
            content: content.clone(),
        },
        IrMessage::ToolError {
            tool_call_id,
            message,
        } => OpenAiMessage::Tool {
            tool_call_id: tool_call_id.clone(),
            content: format!("<tool-error>\n{message}\n</tool-error>"),
        },
    }
}

fn arguments_to_string(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
#[path = "openai.test.rs"]
mod tests;
