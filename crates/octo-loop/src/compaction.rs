use async_trait::async_trait;
use octo_history::History;

use crate::LoopError;

/// Issues the separate summarization completion compaction needs (§4.H
/// step 2). Implemented externally; a plain non-streaming completion call
/// against whatever small model is configured for the purpose.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript_text: String) -> std::result::Result<String, String>;
}

/// Runs history compaction if the rough token estimate exceeds `threshold`.
/// Returns `true` if compaction happened. On a summarization failure, the
/// history is left untouched and the error is returned instead (§4.H step 4
/// says "restore history", which here just means never mutating it before
/// the summary succeeds).
pub async fn maybe_compact(
    history: &mut History,
    summarizer: &dyn Summarizer,
    estimated_tokens: impl Fn(&[octo_protocol::HistoryItem]) -> usize,
    threshold: usize,
) -> Result<bool, LoopError> {
    if estimated_tokens(history.items()) <= threshold {
        return Ok(false);
    }

    let since_len = history.len();
    let transcript = render_transcript(history);
    match summarizer.summarize(transcript).await {
        Ok(summary) => {
            history.compact(summary, since_len);
            Ok(true)
        }
        Err(message) => Err(LoopError::Compaction { message }),
    }
}

fn render_transcript(history: &History) -> String {
    octo_history::compile(history.items())
        .iter()
        .map(|m| format!("{m:?}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "compaction.test.rs"]
mod tests;
