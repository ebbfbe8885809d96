//! Concrete, small-model-backed implementations of the loop crate's two
//! autofixer hooks (§4.I) and its compaction summarizer (§4.H step 2). All
//! three share the same "one-shot: drain the stream to a final string"
//! shape, since none of them need tool calls or incremental token display.

use async_trait::async_trait;
use octo_loop::CompletionClient;
use octo_loop::CompletionRequest;
use octo_loop::DiffAutofixer;
use octo_loop::JsonAutofixer;
use octo_loop::StreamEvent;
use octo_loop::Summarizer;
use octo_providers::ReasoningEffort;
use serde_json::Value;
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Which wire shape `messages` must take for the wrapped client; the
/// `system_prompt` field on [`CompletionRequest`] is honored by the
/// Anthropic client but ignored by the OpenAI one, which instead expects
/// the system prompt folded into `messages[0]` (see `OpenAiCompiler`).
#[derive(Clone, Copy)]
pub enum WireFormat {
    OpenAi,
    Anthropic,
}

/// Wraps a provider [`CompletionClient`] for single-shot, non-streaming-to-
/// the-user completions: used wherever the loop needs a small model's
/// answer to one narrow question rather than a turn of the main agent loop.
pub struct OneShotClient<C> {
    pub client: C,
    pub wire_format: WireFormat,
    pub context_window_tokens: u32,
}

impl<C: CompletionClient> OneShotClient<C> {
    async fn complete(&self, system_prompt: &str, user_content: &str) -> Result<String, String> {
        let messages = match self.wire_format {
            WireFormat::OpenAi => json!([
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_content},
            ]),
            WireFormat::Anthropic => json!([{"role": "user", "content": user_content}]),
        };
        let request = CompletionRequest {
            system_prompt: system_prompt.to_string(),
            messages,
            tools: vec![],
            reasoning_effort: Some(ReasoningEffort::Low),
            context_window_tokens: self.context_window_tokens,
        };
        let mut rx = self
            .client
            .stream(request, CancellationToken::new())
            .await
            .map_err(|e| e.to_string())?;

        let mut out = String::new();
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::ContentDelta(text) => out.push_str(&text),
                StreamEvent::Done => break,
                _ => {}
            }
        }
        Ok(out)
    }
}

const JSON_AUTOFIX_SYSTEM_PROMPT: &str =
    "You repair malformed JSON tool-call arguments. Given the raw text and the expected JSON schema, \
     respond with ONLY the corrected JSON object and nothing else.";

pub struct JsonAutofixClient<C> {
    pub inner: OneShotClient<C>,
}

#[async_trait]
impl<C: CompletionClient> JsonAutofixer for JsonAutofixClient<C> {
    async fn fix(&self, raw_arguments: &str, schema: &Value) -> Option<Value> {
        let prompt = format!("Raw arguments:\n{raw_arguments}\n\nExpected JSON schema:\n{schema}");
        let text = self.inner.complete(JSON_AUTOFIX_SYSTEM_PROMPT, &prompt).await.ok()?;
        serde_json::from_str(text.trim()).ok()
    }
}

const DIFF_AUTOFIX_SYSTEM_PROMPT: &str =
    "You repair a failed search-and-replace edit. The given search text does not occur verbatim in the \
     file content. Find the text in the file content that the caller almost certainly meant, and respond \
     with ONLY that corrected search string, verbatim as it appears in the file, and nothing else.";

pub struct DiffAutofixClient<C> {
    pub inner: OneShotClient<C>,
}

#[async_trait]
impl<C: CompletionClient> DiffAutofixer for DiffAutofixClient<C> {
    async fn fix_search(&self, file_content: &str, search: &str, replace: &str) -> Option<String> {
        let prompt =
            format!("Search text that was not found:\n{search}\n\nIntended replacement:\n{replace}\n\nFile content:\n{file_content}");
        let text = self.inner.complete(DIFF_AUTOFIX_SYSTEM_PROMPT, &prompt).await.ok()?;
        let corrected = text.trim();
        (!corrected.is_empty() && file_content.contains(corrected)).then(|| corrected.to_string())
    }
}

const SUMMARIZER_SYSTEM_PROMPT: &str =
    "You summarize an agent session transcript so it can replace the full history while preserving \
     everything a continuation of the task would need: decisions made, files touched, outstanding work. \
     Respond with ONLY the summary text.";

pub struct CliSummarizer<C> {
    pub inner: OneShotClient<C>,
}

#[async_trait]
impl<C: CompletionClient> Summarizer for CliSummarizer<C> {
    async fn summarize(&self, transcript_text: String) -> Result<String, String> {
        self.inner.complete(SUMMARIZER_SYSTEM_PROMPT, &transcript_text).await
    }
}
