use super::*;

#[test]
fn tool_result_error_sets_is_error_flag() {
    let compiler = AnthropicCompiler {
        system_prompt: String::new(),
    };
    let ir = IrMessage::ToolError {
        tool_call_id: "call-1".into(),
        message: "boom".into(),
    };
    let wire = compiler.encode(&[ir]);
    match &wire[0].content[0] {
        AnthropicBlock::ToolResult { is_error, content, .. } => {
            assert!(is_error);
            assert_eq!(content, "boom");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn signed_thinking_block_round_trips_verbatim() {
    let compiler = AnthropicCompiler {
        system_prompt: String::new(),
    };
    let extras = serde_json::json!({"thinking": "pondering", "signature": "sig-xyz"});
    let ir = IrMessage::Assistant {
        content: "Answer: 42".into(),
        tool_call_id: None,
        tool_name: None,
        tool_arguments: None,
        provider_extras: Some(extras),
    };
    let wire = compiler.encode(&[ir]);
    let blocks = &wire[0].content;
    assert!(matches!(
        &blocks[0],
        AnthropicBlock::Thinking { signature, .. } if signature == "sig-xyz"
    ));
    assert!(matches!(&blocks[1], AnthropicBlock::Text { text } if text == "Answer: 42"));
}

#[test]
fn max_tokens_respects_thinking_budget_and_context_window() {
    let opts = AnthropicRequestOptions::new(ReasoningEffort::High, 16_000);
    assert_eq!(opts.thinking_budget_tokens, 8192);
    assert_eq!(opts.max_tokens, 16_000);

    let opts = AnthropicRequestOptions::new(ReasoningEffort::Low, 1_000_000);
    assert_eq!(opts.max_tokens, 32_000 - 2048);
}

#[test]
fn tool_use_and_tool_result_correlate_by_id() {
    let compiler = AnthropicCompiler {
        system_prompt: String::new(),
    };
    let assistant = IrMessage::Assistant {
        content: String::new(),
        tool_call_id: Some("call-7".into()),
        tool_name: Some("shell".into()),
        tool_arguments: Some(serde_json::json!({"cmd": "ls"})),
        provider_extras: None,
    };
    let result = IrMessage::ToolOutput {
        tool_call_id: "call-7".into(),
        content: "a.txt\n".into(),
        stub: false,
    };
    let wire = compiler.encode(&[assistant, result]);
    let AnthropicBlock::ToolUse { id: use_id, .. } = &wire[0].content[0] else {
        panic!("expected tool use block")
    };
    let AnthropicBlock::ToolResult { tool_use_id, .. } = &wire[1].content[0] else {
        panic!("expected tool result block")
    };
    assert_eq!(use_id, tool_use_id);
}
