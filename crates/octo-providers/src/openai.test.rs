use super::*;

#[test]
fn system_prompt_is_first_message() {
    let compiler = OpenAiCompiler {
        system_prompt: "be helpful".into(),
    };
    let wire = compiler.encode(&[]);
    assert_eq!(wire.len(), 1);
    assert!(matches!(wire[0], OpenAiMessage::System { .. }));
}

#[test]
fn assistant_tool_call_arguments_are_json_strings() {
    let compiler = OpenAiCompiler {
        system_prompt: String::new(),
    };
    let ir = IrMessage::Assistant {
        content: String::new(),
        tool_call_id: Some("call-1".into()),
        tool_name: Some("read".into()),
        tool_arguments: Some(serde_json::json!({"path": "a.txt"})),
        provider_extras: None,
    };
    let wire = compiler.encode(&[ir]);
    match &wire[1] {
        OpenAiMessage::Assistant { tool_calls, .. } => {
            assert_eq!(tool_calls.len(), 1);
            assert_eq!(tool_calls[0].function.arguments, r#"{"path":"a.txt"}"#);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn tool_error_is_wrapped_in_tag() {
    let compiler = OpenAiCompiler {
        system_prompt: String::new(),
    };
    let ir = IrMessage::ToolError {
        tool_call_id: "call-1".into(),
        message: "file not found".into(),
    };
    let wire = compiler.encode(&[ir]);
    match &wire[1] {
        OpenAiMessage::Tool { content, .. } => {
            assert!(content.starts_with("<tool-error>"));
            assert!(content.contains("file not found"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn compaction_checkpoint_frames_as_prior_user_message() {
    let compiler = OpenAiCompiler {
        system_prompt: String::new(),
    };
    let ir = IrMessage::CompactionCheckpoint {
        summary: "did work".into(),
    };
    let wire = compiler.encode(&[ir]);
    match &wire[1] {
        OpenAiMessage::User { content } => {
            assert!(content.contains("<summary>"));
            assert!(content.contains("did work"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
