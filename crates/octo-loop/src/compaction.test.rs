use super::*;
use octo_protocol::HistoryItem;

struct FixedSummarizer(&'static str);

#[async_trait::async_trait]
impl Summarizer for FixedSummarizer {
    async fn summarize(&self, _transcript_text: String) -> std::result::Result<String, String> {
        Ok(self.0.to_string())
    }
}

struct FailingSummarizer;

#[async_trait::async_trait]
impl Summarizer for FailingSummarizer {
    async fn summarize(&self, _transcript_text: String) -> std::result::Result<String, String> {
        Err("provider unreachable".to_string())
    }
}

fn user(h: &History, content: &str) -> HistoryItem {
    HistoryItem::User {
        id: h.next_id(),
        content: content.into(),
        images: vec![],
    }
}

#[tokio::test]
async fn below_threshold_does_not_compact() {
    let mut history = History::new();
    let item = user(&history, "hi");
    history.append(item);

    let summarizer = FixedSummarizer("summary");
    let happened = maybe_compact(&mut history, &summarizer, |_| 1, 100).await.unwrap();
    assert!(!happened);
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn above_threshold_replaces_prefix_with_checkpoint() {
    let mut history = History::new();
    let a = user(&history, "u1");
    history.append(a);
    let b = user(&history, "u2");
    history.append(b);

    let summarizer = FixedSummarizer("work done: wrote a.txt");
    let happened = maybe_compact(&mut history, &summarizer, |_| 1000, 100).await.unwrap();
    assert!(happened);
    assert_eq!(history.len(), 1);
    assert!(matches!(
        history.items()[0],
        HistoryItem::CompactionCheckpoint { .. }
    ));
}

#[tokio::test]
async fn failed_summarization_leaves_history_untouched() {
    let mut history = History::new();
    history.append(user(&history, "u1"));
    let before_len = history.len();

    let summarizer = FailingSummarizer;
    let err = maybe_compact(&mut history, &summarizer, |_| 1000, 100).await.unwrap_err();
    assert!(matches!(err, LoopError::Compaction { .. }));
    assert_eq!(history.len(), before_len);
}
