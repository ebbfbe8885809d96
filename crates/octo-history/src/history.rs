use octo_protocol::HistoryItem;
use octo_protocol::SequenceId;
use octo_protocol::SequenceIdGenerator;

/// The append-only session log.
///
/// Owned exclusively by the agent loop; every other component only reads it
/// (directly, or through [`crate::compile`]). Appends are the only mutation
/// besides the windowing/compaction operations below, both of which replace
/// a prefix rather than mutating in place.
#[derive(Debug, Default)]
pub struct History {
    items: Vec<HistoryItem>,
    ids: SequenceIdGenerator,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequence id without appending anything yet. Callers
    /// that need to correlate an id across several appended items (e.g. an
    /// assistant turn followed by its tool record) call this once up front.
    pub fn next_id(&self) -> SequenceId {
        self.ids.next()
    }

    /// Append one item. Panics if `item.id()` is not greater than the last
    /// appended item's id — this is a structural invariant violation, not a
    /// recoverable error.
    pub fn append(&mut self, item: HistoryItem) {
        if let Some(last) = self.items.last() {
            assert!(
                item.id() > last.id(),
                "history item ids must be strictly increasing: {} is not > {}",
                item.id(),
                last.id()
            );
        }
        self.items.push(item);
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The smallest sequence id still visible (after any compaction).
    pub fn min_visible_id(&self) -> Option<SequenceId> {
        self.items.first().map(HistoryItem::id)
    }

    /// Drop oldest whole assistant/tool-result pairs until `keep_items`
    /// predicate-driven budget is satisfied. `pair_len` returns how many
    /// leading items form the next atomic pair (1 for a lone user/assistant
    /// item with no tool call, 3 for assistant+tool+result). Never splits a
    /// pair; returns `true` if anything was dropped.
    pub fn window_drop_oldest_pairs(&mut self, mut should_drop_more: impl FnMut(&[HistoryItem]) -> bool) -> bool {
        let mut dropped = false;
        while should_drop_more(&self.items) {
            let pair_len = Self::next_pair_len(&self.items);
            if pair_len == 0 || pair_len > self.items.len() {
                break;
            }
            self.items.drain(0..pair_len);
            dropped = true;
        }
        dropped
    }

    /// Length of the oldest atomic unit: an assistant item with a tool call
    /// is followed by exactly one correlated result item, so they must be
    /// dropped together; anything else is a unit of one.
    fn next_pair_len(items: &[HistoryItem]) -> usize {
        match items.first() {
            Some(HistoryItem::Assistant {
                tool_call: Some(tc),
                ..
            }) => {
                let id = tc.tool_call_id.clone();
                items
                    .iter()
                    .skip(1)
                    .position(|it| it.tool_call_id() == Some(id.as_str()))
                    .map(|pos| pos + 2)
                    .unwrap_or(1)
            }
            Some(_) => 1,
            None => 0,
        }
    }

    /// Replace everything with a single checkpoint, preserving items newer
    /// than `since` (appended while compaction's summarization call was in
    /// flight).
    pub fn compact(&mut self, summary: String, since_len: usize) {
        let id = self.next_id();
        let checkpoint = HistoryItem::CompactionCheckpoint { id, summary };
        let tail: Vec<HistoryItem> = self.items.split_off(since_len.min(self.items.len()));
        self.items = vec![checkpoint];
        self.items.extend(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octo_protocol::ToolCall;
    use serde_json::json;

    fn user(h: &History, content: &str) -> HistoryItem {
        HistoryItem::User {
            id: h.next_id(),
            content: content.into(),
            images: vec![],
        }
    }

    #[test]
    fn append_enforces_strictly_increasing_ids() {
        let mut h = History::new();
        let a = user(&h, "hi");
        h.append(a);
        let id = h.next_id();
        // Re-using an id that is not greater than the last appended panics.
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut h2 = History::new();
            h2.append(HistoryItem::User {
                id,
                content: "a".into(),
                images: vec![],
            });
            h2.append(HistoryItem::User {
                id,
                content: "b".into(),
                images: vec![],
            });
        }));
        assert!(result.is_err());
    }

    #[test]
    fn window_never_splits_assistant_tool_pair() {
        let mut h = History::new();
        h.append(user(&h, "u1"));
        let assistant_id = h.next_id();
        let tc = ToolCall::new("call-1", "read", json!({"path": "a"}));
        h.append(HistoryItem::Assistant {
            id: assistant_id,
            content: String::new(),
            reasoning_content: None,
            tool_call: Some(tc.clone()),
            token_usage: Default::default(),
            output_tokens: 0,
            provider_extras: None,
        });
        h.append(HistoryItem::FileRead {
            id: h.next_id(),
            tool_call: tc,
            path: "a".into(),
            content: "content".into(),
        });
        h.append(user(&h, "u2"));

        // Drop u1, then the assistant+file-read pair as one unit.
        let mut drops = 0;
        h.window_drop_oldest_pairs(|_| {
            drops += 1;
            drops <= 2
        });

        // The assistant+file-read pair must be gone together, never split.
        assert_eq!(h.items().len(), 1);
        assert!(matches!(h.items()[0], HistoryItem::User { .. }));
    }

    #[test]
    fn compact_preserves_items_appended_during_compaction() {
        let mut h = History::new();
        h.append(user(&h, "u1"));
        h.append(user(&h, "u2"));
        let since_len = h.len();
        h.append(user(&h, "u3-appended-during-compaction"));

        h.compact("summary text".into(), since_len);

        assert_eq!(h.items().len(), 2);
        assert!(matches!(
            h.items()[0],
            HistoryItem::CompactionCheckpoint { .. }
        ));
        assert!(matches!(h.items()[1], HistoryItem::User { .. }));
    }
}
