use octo_providers::ReasoningEffort;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::LoopError;

/// What the loop sends a provider to open a streaming completion (§4.F
/// step 2-3). `messages` is the already-encoded wire array (whatever shape
/// the caller's [`octo_providers::ProviderCompiler`] produced), kept
/// opaque here so this crate never depends on a specific provider shape.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub messages: Value,
    /// JSON schema for every enabled tool, keyed by name (§6 "Tool argument
    /// schemas"); the concrete client renders these into whatever shape its
    /// wire format wants (`tools[]` for OpenAI, `tools[]` for Anthropic).
    pub tools: Vec<(String, Value)>,
    pub reasoning_effort: Option<ReasoningEffort>,
    /// The configured model context window, threaded through so a concrete
    /// client can clamp its own `max_tokens` request against it (§6).
    pub context_window_tokens: u32,
}

/// One event off the wire, already normalized to the shape §4.F's
/// algorithm switches on. A concrete client (SSE-over-HTTP, typically)
/// parses provider-specific chunks into these and pushes them down the
/// channel [`CompletionClient::stream`] returns.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Raw assistant content delta, not yet split by the `<think>` parser.
    ContentDelta(String),
    /// Provider-native reasoning delta (already split; e.g. Anthropic's
    /// `thinking` blocks arrive this way instead of inline tags).
    ReasoningDelta(String),
    /// Opaque provider state that must round-trip verbatim (§3 `providerExtras`).
    ProviderExtras(Value),
    ToolCallDelta {
        id: Option<String>,
        name: Option<String>,
        arguments_fragment: Option<String>,
    },
    Usage {
        input_tokens: i64,
        output_tokens: i64,
    },
    Done,
}

/// Opens a streaming completion. Implemented externally per provider; the
/// loop only ever sees the normalized [`StreamEvent`] channel.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    async fn stream(
        &self,
        request: CompletionRequest,
        abort: CancellationToken,
    ) -> std::result::Result<mpsc::Receiver<StreamEvent>, LoopError>;
}
