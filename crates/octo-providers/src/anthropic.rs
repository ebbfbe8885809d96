//! Anthropic messages API: content-block arrays with `tool_use` /
//! `tool_result`, and signed `thinking` blocks that must round-trip verbatim.

use octo_history::IrMessage;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ProviderCompiler;
use crate::ReasoningEffort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnthropicRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicMessage {
    pub role: AnthropicRole,
    pub content: Vec<AnthropicBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// Opaque, signed reasoning block. `signature` must be replayed verbatim;
    /// the core never tries to re-derive it.
    Thinking {
        thinking: String,
        signature: String,
    },
}

/// Request-level knobs for a thinking-enabled Anthropic request (§6).
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequestOptions {
    pub thinking_enabled: bool,
    pub thinking_budget_tokens: u32,
    pub disable_parallel_tool_use: bool,
    pub max_tokens: u32,
}

impl AnthropicRequestOptions {
    /// `max_tokens = min(32000 - thinking_budget, model.context)`.
    pub fn new(effort: ReasoningEffort, model_context: u32) -> Self {
        let budget = effort.thinking_budget_tokens();
        let max_tokens = (32_000u32.saturating_sub(budget)).min(model_context);
        Self {
            thinking_enabled: true,
            thinking_budget_tokens: budget,
            disable_parallel_tool_use: true,
            max_tokens,
        }
    }
}

pub struct AnthropicCompiler {
    pub system_prompt: String,
}

impl ProviderCompiler for AnthropicCompiler {
    type WireMessage = AnthropicMessage;

    fn encode(&self, messages: &[IrMessage]) -> Vec<AnthropicMessage> {
        // The system prompt travels in a dedicated top-level field on the
        // Anthropic wire request, not as a message; callers read it off
        // `self.system_prompt` directly when building the request body.
        messages.iter().map(encode_one).collect()
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

fn encode_one(msg: &IrMessage) -> AnthropicMessage {
    match msg {
        IrMessage::User { content } => AnthropicMessage {
            role: AnthropicRole::User,
            content: vec![AnthropicBlock::Text {
                text: content.clone(),
            }],
        },
        IrMessage::CompactionCheckpoint { summary } => AnthropicMessage {
            role: AnthropicRole::User,
            content: vec![AnthropicBlock::Text {
                text: format!("<summary>\n{summary}\n</summary>"),
            }],
        },
        IrMessage::Assistant {
            content,
            tool_call_id,
            tool_name,
            tool_arguments,
            provider_extras,
        } => {
            let mut blocks = Vec::new();
            if let Some((thinking, signature)) = extract_signed_thinking(provider_extras) {
                blocks.push(AnthropicBlock::Thinking { thinking, signature });
            }
            if !content.is_empty() {
                blocks.push(AnthropicBlock::Text {
                    text: content.clone(),
                });
            }
            if let (Some(id), Some(name), Some(input)) = (tool_call_id, tool_name, tool_arguments) {
                blocks.push(AnthropicBlock::ToolUse {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                });
            }
            AnthropicMessage {
                role: AnthropicRole::Assistant,
                content: blocks,
            }
        }
        IrMessage::ToolOutput {
            tool_call_id,
            content,
            ..
        } => AnthropicMessage {
            role: AnthropicRole::User,
            content: vec![AnthropicBlock::ToolResult {
                tool_use_id: tool_call_id.clone(),
                content: content.clone(),
                is_error: false,
            }],
        },
        IrMessage::ToolError {
            tool_call_id,
            message,
        } => AnthropicMessage {
            role: AnthropicRole::User,
            content: vec![AnthropicBlock::ToolResult {
                tool_use_id: tool_call_id.clone(),
                content: message.clone(),
                is_error: true,
            }],
        },
    }
}

/// `provider_extras` opaquely carries `{"thinking": "...", "signature": "..."}`
/// for providers that sign their reasoning blocks.
fn extract_signed_thinking(extras: &Option<Value>) -> Option<(String, String)> {
    let obj = extras.as_ref()?.as_object()?;
    let thinking = obj.get("thinking")?.as_str()?.to_string();
    let signature = obj.get("signature")?.as_str()?.to_string();
    Some((thinking, signature))
}

#[cfg(test)]
#[path = "anthropic.test.rs"]
mod tests;
