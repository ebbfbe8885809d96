//! Provider compilers: map the IR to/from wire messages for one
//! OpenAI-compatible and one Anthropic-compatible chat API.

mod anthropic;
mod openai;
mod reasoning;

pub use anthropic::AnthropicCompiler;
pub use anthropic::AnthropicMessage;
pub use anthropic::AnthropicRequestOptions;
pub use openai::OpenAiCompiler;
pub use openai::OpenAiMessage;
pub use openai::OpenAiRequestOptions;
pub use reasoning::ReasoningEffort;

use octo_history::IrMessage;

/// Maps the provider-neutral IR onto one provider's wire message shape.
///
/// Implementations only need to handle encoding here; decoding streamed
/// wire chunks back into IR deltas is the agent loop's job (it consumes
/// provider-specific stream events directly, see `octo-loop`).
pub trait ProviderCompiler {
    type WireMessage;

    fn encode(&self, messages: &[IrMessage]) -> Vec<Self::WireMessage>;

    /// The system prompt this compiler was built with. OpenAI folds it into
    /// `encode`'s output as the first message; Anthropic keeps it out of the
    /// message array entirely, so callers building the wire request need it
    /// available regardless of which compiler they're holding.
    fn system_prompt(&self) -> &str;
}
