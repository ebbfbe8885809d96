use super::*;
use octo_history::History;
use octo_history::IrMessage;
use octo_protocol::HistoryItem;
use octo_providers::ProviderCompiler;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Echoes the compiled IR straight onto the wire; good enough to exercise
/// `run_turn`'s plumbing without pulling in a real provider.
struct EchoCompiler;

impl ProviderCompiler for EchoCompiler {
    type WireMessage = String;

    fn encode(&self, messages: &[IrMessage]) -> Vec<String> {
        messages.iter().map(|m| format!("{m:?}")).collect()
    }

    fn system_prompt(&self) -> &str {
        ""
    }
}

/// Replays a fixed script of `StreamEvent`s, ignoring whatever was asked for.
struct ScriptedClient {
    events: Vec<StreamEvent>,
}

#[async_trait::async_trait]
impl CompletionClient for ScriptedClient {
    async fn stream(
        &self,
        _request: CompletionRequest,
        _abort: CancellationToken,
    ) -> Result<mpsc::Receiver<StreamEvent>, LoopError> {
        let (tx, rx) = mpsc::channel(self.events.len().max(1));
        for event in self.events.clone() {
            tx.send(event).await.unwrap();
        }
        Ok(rx)
    }
}

/// Never resolves until aborted; used to exercise the cancellation path.
struct HangingClient;

#[async_trait::async_trait]
impl CompletionClient for HangingClient {
    async fn stream(
        &self,
        _request: CompletionRequest,
        _abort: CancellationToken,
    ) -> Result<mpsc::Receiver<StreamEvent>, LoopError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }
}

fn no_tools() -> impl FnMut(&str, TokenKind) {
    |_, _| {}
}

#[tokio::test]
async fn think_tags_split_into_reasoning_and_content() {
    let events = vec![
        StreamEvent::ContentDelta("<think>pondering</think>Answer: 42".to_string()),
        StreamEvent::Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
        StreamEvent::Done,
    ];
    let agent = AgentLoop {
        completion_client: ScriptedClient { events },
        context_window_tokens: 100_000,
        window_headroom_tokens: 1_000,
        reasoning_effort: None,
    };
    let mut history = History::new();
    let mut on_tokens = no_tools();

    let outcome = agent
        .run_turn(
            &mut history,
            &EchoCompiler,
            "",
            None,
            None,
            0,
            CancellationToken::new(),
            &mut on_tokens,
        )
        .await
        .unwrap();

    assert!(!outcome.aborted);
    assert!(outcome.tool_call.is_none());
    let HistoryItem::Assistant {
        content,
        reasoning_content,
        ..
    } = &history.items()[0]
    else {
        panic!("expected an assistant item");
    };
    assert_eq!(content, "Answer: 42");
    assert_eq!(reasoning_content.as_deref(), Some("pondering"));
}

#[tokio::test]
async fn well_formed_tool_call_appends_assistant_and_tool_items() {
    let events = vec![
        StreamEvent::ToolCallDelta {
            id: Some("call-1".to_string()),
            name: Some("read".to_string()),
            arguments_fragment: Some("{\"path\":".to_string()),
        },
        StreamEvent::ToolCallDelta {
            id: Some("call-1".to_string()),
            name: None,
            arguments_fragment: Some("\"a.txt\"}".to_string()),
        },
        StreamEvent::Done,
    ];
    let agent = AgentLoop {
        completion_client: ScriptedClient { events },
        context_window_tokens: 100_000,
        window_headroom_tokens: 1_000,
        reasoning_effort: None,
    };
    let mut history = History::new();
    let mut on_tokens = no_tools();

    let outcome = agent
        .run_turn(
            &mut history,
            &EchoCompiler,
            "",
            None,
            None,
            0,
            CancellationToken::new(),
            &mut on_tokens,
        )
        .await
        .unwrap();

    let call = outcome.tool_call.expect("expected a well-formed tool call");
    assert_eq!(call.name, "read");
    assert_eq!(call.arguments, json!({"path": "a.txt"}));
    assert_eq!(history.len(), 2);
    assert!(matches!(history.items()[1], HistoryItem::Tool { .. }));
}

#[tokio::test]
async fn unknown_tool_name_is_recorded_as_malformed() {
    let events = vec![
        StreamEvent::ToolCallDelta {
            id: Some("call-1".to_string()),
            name: Some("not-a-real-tool".to_string()),
            arguments_fragment: Some("{}".to_string()),
        },
        StreamEvent::Done,
    ];
    let agent = AgentLoop {
        completion_client: ScriptedClient { events },
        context_window_tokens: 100_000,
        window_headroom_tokens: 1_000,
        reasoning_effort: None,
    };
    let mut history = History::new();
    let mut on_tokens = no_tools();

    struct EmptyRegistry;
    impl ToolSchemaLookup for EmptyRegistry {
        fn schema_for(&self, _tool_name: &str) -> Option<serde_json::Value> {
            None
        }
        fn knows(&self, _tool_name: &str) -> bool {
            false
        }
        fn all_schemas(&self) -> Vec<(String, serde_json::Value)> {
            vec![]
        }
    }

    let outcome = agent
        .run_turn(
            &mut history,
            &EchoCompiler,
            "",
            Some(&EmptyRegistry),
            None,
            0,
            CancellationToken::new(),
            &mut on_tokens,
        )
        .await
        .unwrap();

    assert!(outcome.tool_call.is_none());
    assert!(matches!(history.items()[1], HistoryItem::ToolMalformed { .. }));
}

#[tokio::test]
async fn aborted_turn_appends_assistant_without_tool_call() {
    let agent = AgentLoop {
        completion_client: HangingClient,
        context_window_tokens: 100_000,
        window_headroom_tokens: 1_000,
        reasoning_effort: None,
    };
    let mut history = History::new();
    let mut on_tokens = no_tools();
    let abort = CancellationToken::new();
    abort.cancel();

    let outcome = agent
        .run_turn(
            &mut history,
            &EchoCompiler,
            "",
            None,
            None,
            0,
            abort,
            &mut on_tokens,
        )
        .await
        .unwrap();

    assert!(outcome.aborted);
    assert!(outcome.tool_call.is_none());
    assert_eq!(history.len(), 1);
    assert!(matches!(
        history.items()[0],
        HistoryItem::Assistant { tool_call: None, .. }
    ));
}
