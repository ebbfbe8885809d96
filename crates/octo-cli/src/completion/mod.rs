//! Concrete [`octo_loop::CompletionClient`] implementations, one per wire
//! family named in §6.

mod anthropic;
mod openai;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;
