//! The agent loop (§4.F): one streamed completion, its reasoning/content
//! split, tool-call accumulation and dispatch, windowing, and cancellation.
//! Also home to history compaction (§4.H) and the autofix hooks (§4.I)
//! that the loop and dispatch layer invoke.

mod compaction;
mod dispatch;
mod error;
mod loop_;
mod stream;
mod tool_call_builder;

pub use compaction::Summarizer;
pub use compaction::maybe_compact;
pub use dispatch::DiffAutofixer;
pub use dispatch::dispatch_and_record;
pub use dispatch::record_tool_reject;
pub use error::LoopError;
pub use loop_::AgentLoop;
pub use loop_::JsonAutofixer;
pub use loop_::TokenKind;
pub use loop_::ToolSchemaLookup;
pub use loop_::TurnOutcome;
pub use loop_::estimate_tokens;
pub use stream::CompletionClient;
pub use stream::CompletionRequest;
pub use stream::StreamEvent;
pub use tool_call_builder::ToolCallBuilder;

#[cfg(test)]
#[path = "loop_.test.rs"]
mod loop_tests;
