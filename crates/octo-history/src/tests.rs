use octo_protocol::HistoryItem;
use octo_protocol::SequenceIdGenerator;
use octo_protocol::ToolCall;
use serde_json::json;

use crate::compile;
use crate::ir::IrMessage;

fn read_item(ids: &SequenceIdGenerator, path: &str, content: &str, call: &str) -> HistoryItem {
    HistoryItem::FileRead {
        id: ids.next(),
        tool_call: ToolCall::new(call, "read", json!({"path": path})),
        path: path.to_string(),
        content: content.to_string(),
    }
}

#[test]
fn older_file_read_becomes_stub_newest_keeps_content() {
    let ids = SequenceIdGenerator::new();
    let items = vec![
        read_item(&ids, "/a.txt", "first version", "call-1"),
        read_item(&ids, "/a.txt", "second version", "call-2"),
    ];

    let ir = compile(&items);
    match &ir[0] {
        IrMessage::ToolOutput { content, stub, .. } => {
            assert!(*stub);
            assert_eq!(content, "File was successfully read");
        }
        other => panic!("unexpected {other:?}"),
    }
    match &ir[1] {
        IrMessage::ToolOutput { content, stub, .. } => {
            assert!(!*stub);
            assert_eq!(content, "second version");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn distinct_paths_are_never_deduped() {
    let ids = SequenceIdGenerator::new();
    let items = vec![
        read_item(&ids, "/a.txt", "A", "call-1"),
        read_item(&ids, "/b.txt", "B", "call-2"),
    ];
    let ir = compile(&items);
    for msg in &ir {
        match msg {
            IrMessage::ToolOutput { stub, .. } => assert!(!stub),
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn recoverable_errors_become_tool_error_nodes() {
    let ids = SequenceIdGenerator::new();
    let tool_call = ToolCall::new("call-1", "edit", json!({}));
    let items = vec![HistoryItem::FileOutdated {
        id: ids.next(),
        tool_call,
        path: "/a.txt".into(),
        error: "file changed on disk".into(),
    }];
    let ir = compile(&items);
    assert_eq!(ir.len(), 1);
    match &ir[0] {
        IrMessage::ToolError { message, .. } => {
            assert!(message.contains("file changed on disk"));
            assert!(message.contains("re-read"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn nothing_before_a_compaction_checkpoint_survives() {
    let ids = SequenceIdGenerator::new();
    let items = vec![
        HistoryItem::User {
            id: ids.next(),
            content: "old message, should vanish".into(),
            images: vec![],
        },
        HistoryItem::CompactionCheckpoint {
            id: ids.next(),
            summary: "did some work".into(),
        },
        HistoryItem::User {
            id: ids.next(),
            content: "new message".into(),
            images: vec![],
        },
    ];
    let ir = compile(&items);
    assert_eq!(ir.len(), 2);
    assert!(matches!(ir[0], IrMessage::CompactionCheckpoint { .. }));
    assert!(matches!(ir[1], IrMessage::User { .. }));
}

#[test]
fn notifications_never_reach_the_model() {
    let ids = SequenceIdGenerator::new();
    let items = vec![HistoryItem::Notification {
        id: ids.next(),
        content: "heads up".into(),
    }];
    assert!(compile(&items).is_empty());
}
