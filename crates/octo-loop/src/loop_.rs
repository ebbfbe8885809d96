use async_trait::async_trait;
use octo_history::History;
use octo_history::IrMessage;
use octo_protocol::HistoryItem;
use octo_protocol::TokenUsage;
use octo_protocol::ToolCall;
use octo_providers::ProviderCompiler;
use octo_xml::Parser;
use octo_xml::XmlEvent;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::LoopError;
use crate::ToolCallBuilder;
use crate::stream::CompletionClient;
use crate::stream::CompletionRequest;
use crate::stream::StreamEvent;

/// What kind of token `on_tokens` is reporting, per §4.F's `onTokens`
/// callback contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Content,
    Reasoning,
}

/// Given a malformed argument string and the tool's schema, proposes a
/// corrected JSON object. Invoked at most once per tool call (§4.I).
#[async_trait]
pub trait JsonAutofixer: Send + Sync {
    async fn fix(&self, raw_arguments: &str, schema: &Value) -> Option<Value>;
}

/// Result of running one turn of the loop (§4.F).
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Present only if the turn ended in a well-formed tool call the outer
    /// driver should now dispatch.
    pub tool_call: Option<ToolCall>,
    /// Set if windowing had to drop history items to fit the budget.
    pub applied_window: bool,
    pub usage: TokenUsage,
    /// True if the turn was cut short by `abort`; the assistant record was
    /// still appended, without a tool call, per the cancellation invariant.
    pub aborted: bool,
}

/// Looks up a tool's argument schema by name, used to hand the autofixer
/// the expected shape. Kept as a narrow trait so this crate doesn't need a
/// hard dependency on `octo-tools`'s full registry type in the turn's
/// signature.
pub trait ToolSchemaLookup {
    fn schema_for(&self, tool_name: &str) -> Option<Value>;
    fn knows(&self, tool_name: &str) -> bool;
    /// Every enabled tool's name and argument schema, used to populate the
    /// wire request's `tools` array (§6).
    fn all_schemas(&self) -> Vec<(String, Value)>;
}

impl ToolSchemaLookup for octo_tools::ToolRegistry {
    fn schema_for(&self, tool_name: &str) -> Option<Value> {
        self.get(tool_name).map(|t| t.schema())
    }

    fn knows(&self, tool_name: &str) -> bool {
        self.get(tool_name).is_some()
    }

    fn all_schemas(&self) -> Vec<(String, Value)> {
        self.names()
            .map(|name| (name.to_string(), self.get(name).expect("name came from registry").schema()))
            .collect()
    }
}

/// Drives one request/stream/tool-call cycle of the agent loop.
pub struct AgentLoop<Client> {
    pub completion_client: Client,
    /// Model context window, used for windowing (§4.F "windowing").
    pub context_window_tokens: u32,
    /// Headroom subtracted from the context window before windowing kicks in.
    pub window_headroom_tokens: u32,
    /// Requested reasoning effort, if the active model supports it (§6).
    pub reasoning_effort: Option<octo_providers::ReasoningEffort>,
}

impl<Client: CompletionClient> AgentLoop<Client> {
    /// Drop oldest whole assistant/tool pairs until history's rough token
    /// estimate fits the budget. Returns whether anything was dropped, or
    /// `WindowBudgetUnreachable` if dropping every droppable pair still
    /// leaves the estimate over budget.
    pub fn apply_window(&self, history: &mut History) -> Result<bool, LoopError> {
        let budget = self.context_window_tokens.saturating_sub(self.window_headroom_tokens) as usize;
        let dropped = history.window_drop_oldest_pairs(|items| estimate_tokens(items) > budget);
        if estimate_tokens(history.items()) > budget {
            return Err(LoopError::WindowBudgetUnreachable);
        }
        Ok(dropped)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn run_turn<C>(
        &self,
        history: &mut History,
        compiler: &C,
        context_block: &str,
        registry: Option<&dyn ToolSchemaLookup>,
        json_autofixer: Option<&dyn JsonAutofixer>,
        prior_history_tokens: i64,
        abort: CancellationToken,
        on_tokens: &mut dyn FnMut(&str, TokenKind),
    ) -> Result<TurnOutcome, LoopError>
    where
        C: ProviderCompiler,
        C::WireMessage: Serialize,
    {
        let applied_window = self.apply_window(history)?;

        let mut ir = octo_history::compile(history.items());
        if !context_block.is_empty() {
            ir.push(IrMessage::User {
                content: context_block.to_string(),
            });
        }
        let wire = compiler.encode(&ir);
        let messages = serde_json::to_value(&wire).map_err(|e| LoopError::Stream {
            message: e.to_string(),
        })?;

        let tools = registry.map(|r| r.all_schemas()).unwrap_or_default();

        let request = CompletionRequest {
            system_prompt: compiler.system_prompt().to_string(),
            messages,
            tools,
            reasoning_effort: self.reasoning_effort,
            context_window_tokens: self.context_window_tokens,
        };

        let mut receiver = self.completion_client.stream(request, abort.clone()).await?;

        let mut xml = Parser::new(["think"]);
        let mut in_think = false;
        let mut content = String::new();
        let mut reasoning = String::new();
        let mut provider_extras = None;
        let mut tool_builder = ToolCallBuilder::new();
        let mut usage = TokenUsage::default();
        let mut aborted = false;

        loop {
            tokio::select! {
                biased;
                _ = abort.cancelled() => {
                    aborted = true;
                    break;
                }
                event = receiver.recv() => {
                    match event {
                        None | Some(StreamEvent::Done) => break,
                        Some(StreamEvent::ContentDelta(text)) => {
                            xml.write(&text, |ev| route_xml_event(ev, &mut in_think, &mut content, &mut reasoning, on_tokens));
                        }
                        Some(StreamEvent::ReasoningDelta(text)) => {
                            on_tokens(&text, TokenKind::Reasoning);
                            reasoning.push_str(&text);
                        }
                        Some(StreamEvent::ProviderExtras(value)) => {
                            provider_extras = Some(value);
                        }
                        Some(StreamEvent::ToolCallDelta { id, name, arguments_fragment }) => {
                            tool_builder.feed(id, name, arguments_fragment);
                        }
                        Some(StreamEvent::Usage { input_tokens, output_tokens }) => {
                            usage = TokenUsage::new(input_tokens, output_tokens);
                        }
                    }
                }
            }
        }

        xml.close(|ev| route_xml_event(ev, &mut in_think, &mut content, &mut reasoning, on_tokens));

        let token_delta = usage.total() - prior_history_tokens;
        let reasoning_content = (!reasoning.is_empty()).then_some(reasoning);

        if aborted {
            history.append(HistoryItem::Assistant {
                id: history.next_id(),
                content,
                reasoning_content,
                tool_call: None,
                token_usage: usage,
                output_tokens: token_delta,
                provider_extras,
            });
            return Ok(TurnOutcome {
                tool_call: None,
                applied_window,
                usage,
                aborted: true,
            });
        }

        let Some((id, name, raw_arguments)) = tool_builder.finish() else {
            history.append(HistoryItem::Assistant {
                id: history.next_id(),
                content,
                reasoning_content,
                tool_call: None,
                token_usage: usage,
                output_tokens: token_delta,
                provider_extras,
            });
            return Ok(TurnOutcome {
                tool_call: None,
                applied_window,
                usage,
                aborted: false,
            });
        };

        let known = registry.map(|r| r.knows(&name)).unwrap_or(true);
        let mut parsed = serde_json::from_str::<Value>(&raw_arguments).ok();

        if known && parsed.is_none() {
            if let (Some(autofixer), Some(registry)) = (json_autofixer, registry) {
                if let Some(schema) = registry.schema_for(&name) {
                    parsed = autofixer.fix(&raw_arguments, &schema).await;
                }
            }
        }

        match (known, parsed) {
            (true, Some(arguments)) => {
                let call = ToolCall::new(id, name, arguments);
                history.append(HistoryItem::Assistant {
                    id: history.next_id(),
                    content,
                    reasoning_content,
                    tool_call: Some(call.clone()),
                    token_usage: usage,
                    output_tokens: token_delta,
                    provider_extras,
                });
                history.append(HistoryItem::Tool {
                    id: history.next_id(),
                    tool_call: call.clone(),
                });
                Ok(TurnOutcome {
                    tool_call: Some(call),
                    applied_window,
                    usage,
                    aborted: false,
                })
            }
            (known, _) => {
                let error = if known {
                    "arguments did not parse as JSON even after autofix".to_string()
                } else {
                    format!("no tool named {name}")
                };
                history.append(HistoryItem::Assistant {
                    id: history.next_id(),
                    content,
                    reasoning_content,
                    tool_call: None,
                    token_usage: usage,
                    output_tokens: token_delta,
                    provider_extras,
                });
                history.append(HistoryItem::ToolMalformed {
                    id: history.next_id(),
                    tool_call_id: id,
                    tool_name: name,
                    arguments: raw_arguments,
                    error,
                });
                Ok(TurnOutcome {
                    tool_call: None,
                    applied_window,
                    usage,
                    aborted: false,
                })
            }
        }
    }
}

fn route_xml_event(
    event: XmlEvent,
    in_think: &mut bool,
    content: &mut String,
    reasoning: &mut String,
    on_tokens: &mut dyn FnMut(&str, TokenKind),
) {
    match event {
        XmlEvent::Text(text) => {
            if *in_think {
                on_tokens(&text, TokenKind::Reasoning);
                reasoning.push_str(&text);
            } else {
                on_tokens(&text, TokenKind::Content);
                content.push_str(&text);
            }
        }
        XmlEvent::OpenTag(name) if name == "think" => *in_think = true,
        XmlEvent::CloseTag(name) if name == "think" => *in_think = false,
        _ => {}
    }
}

/// Rough token estimate (~4 bytes/token) over the compiled IR. Used to
/// decide when windowing must kick in, and reused by `maybe_compact`'s
/// caller to decide when compaction must kick in (§4.H).
pub fn estimate_tokens(items: &[HistoryItem]) -> usize {
    octo_history::compile(items)
        .iter()
        .map(ir_message_len)
        .sum::<usize>()
        / 4
}

fn ir_message_len(msg: &IrMessage) -> usize {
    match msg {
        IrMessage::User { content } => content.len(),
        IrMessage::Assistant { content, tool_arguments, .. } => {
            content.len() + tool_arguments.as_ref().map(|v| v.to_string().len()).unwrap_or(0)
        }
        IrMessage::ToolOutput { content, .. } => content.len(),
        IrMessage::ToolError { message, .. } => message.len(),
        IrMessage::CompactionCheckpoint { summary } => summary.len(),
    }
}
