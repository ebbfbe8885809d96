use super::*;
use async_trait::async_trait;
use octo_protocol::DirEntry;
use octo_protocol::ShellOutput;
use octo_protocol::ToolCall;
use octo_protocol::Transport;
use octo_tools::ToolOutcome;
use octo_tracker::FileTracker;
use serde_json::json;
use std::path::PathBuf;

struct LocalTransport;

#[async_trait]
impl Transport for LocalTransport {
    async fn shell(&self, _signal: &CancellationToken, cmd: &str, _timeout_ms: u64) -> std::io::Result<ShellOutput> {
        let output = tokio::process::Command::new("sh").arg("-c").arg(cmd).output().await?;
        Ok(ShellOutput {
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
    async fn mkdir(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }
    async fn path_exists(&self, _signal: &CancellationToken, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
    async fn write_file(&self, _signal: &CancellationToken, path: &Path, content: &str) -> std::io::Result<()> {
        tokio::fs::write(path, content).await
    }
    async fn read_file(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
    async fn is_directory(&self, _signal: &CancellationToken, path: &Path) -> bool {
        tokio::fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
    }
    async fn readdir(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<Vec<DirEntry>> {
        let mut rd = tokio::fs::read_dir(path).await?;
        let mut out = Vec::new();
        while let Some(entry) = rd.next_entry().await? {
            out.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory: entry.file_type().await?.is_dir(),
            });
        }
        Ok(out)
    }
    async fn mod_time(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<std::time::SystemTime> {
        tokio::fs::metadata(path).await?.modified()
    }
    async fn resolve_path(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<PathBuf> {
        Ok(path.to_path_buf())
    }
    async fn cwd(&self, _signal: &CancellationToken) -> std::io::Result<PathBuf> {
        Ok(PathBuf::from("."))
    }
    async fn close(&self) {}
}

fn make_ctx(plan_file_path: Option<String>) -> ToolContext {
    ToolContext {
        transport: std::sync::Arc::new(LocalTransport),
        tracker: std::sync::Arc::new(FileTracker::new()),
        mode: octo_protocol::Mode::Unchained,
        mcp_clients: std::collections::HashMap::new(),
        plan_file_path,
        context_window_tokens: 4096,
        web_search_client: None,
        task_runner: None,
        skills_dir: None,
        abort: CancellationToken::new(),
    }
}

fn call(name: &str) -> ToolCall {
    ToolCall::new("c1", name, json!({"path": "a.txt"}))
}

#[test]
fn output_on_read_tool_is_file_read() {
    let mut history = History::new();
    append_outcome(
        &mut history,
        &call("read"),
        DispatchOutcome::Output(ToolOutcome::new("hello")),
        None,
    );
    match history.items().last().unwrap() {
        HistoryItem::FileRead { path, content, .. } => {
            assert_eq!(path, "a.txt");
            assert_eq!(content, "hello");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn output_on_mutating_tool_is_file_mutate() {
    for name in ["edit", "create", "append", "prepend", "rewrite"] {
        let mut history = History::new();
        append_outcome(&mut history, &call(name), DispatchOutcome::Output(ToolOutcome::new("")), None);
        match history.items().last().unwrap() {
            HistoryItem::FileMutate { path, .. } => assert_eq!(path, "a.txt"),
            other => panic!("unexpected {other:?} for tool {name}"),
        }
    }
}

#[test]
fn output_on_write_plan_is_plan_written() {
    let mut history = History::new();
    append_outcome(
        &mut history,
        &ToolCall::new("c1", "write-plan", json!({"content": "1. step"})),
        DispatchOutcome::Output(ToolOutcome::new("1. step")),
        Some("PLAN.md"),
    );
    match history.items().last().unwrap() {
        HistoryItem::PlanWritten {
            plan_file_path, content, ..
        } => {
            assert_eq!(plan_file_path, "PLAN.md");
            assert_eq!(content, "1. step");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn output_on_other_tool_is_tool_output() {
    let mut history = History::new();
    append_outcome(
        &mut history,
        &ToolCall::new("c1", "shell", json!({"cmd": "echo hi"})),
        DispatchOutcome::Output(ToolOutcome::with_lines("hi\n", 1)),
        None,
    );
    match history.items().last().unwrap() {
        HistoryItem::ToolOutput { content, lines, .. } => {
            assert_eq!(content, "hi\n");
            assert_eq!(*lines, Some(1));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn failed_is_tool_failed() {
    let mut history = History::new();
    append_outcome(&mut history, &call("shell"), DispatchOutcome::Failed("boom".to_string()), None);
    match history.items().last().unwrap() {
        HistoryItem::ToolFailed { error, tool_name, .. } => {
            assert_eq!(error, "boom");
            assert_eq!(tool_name, "shell");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn malformed_is_tool_malformed() {
    let mut history = History::new();
    append_outcome(
        &mut history,
        &call("shell"),
        DispatchOutcome::Malformed("bad args".to_string()),
        None,
    );
    match history.items().last().unwrap() {
        HistoryItem::ToolMalformed { error, .. } => assert_eq!(error, "bad args"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn file_outdated_is_file_outdated() {
    let mut history = History::new();
    append_outcome(
        &mut history,
        &call("edit"),
        DispatchOutcome::FileOutdated {
            path: "a.txt".to_string(),
            error: "mtime advanced".to_string(),
        },
        None,
    );
    match history.items().last().unwrap() {
        HistoryItem::FileOutdated { path, error, .. } => {
            assert_eq!(path, "a.txt");
            assert_eq!(error, "mtime advanced");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn file_unreadable_is_file_unreadable() {
    let mut history = History::new();
    append_outcome(
        &mut history,
        &call("read"),
        DispatchOutcome::FileUnreadable {
            path: "a.txt".to_string(),
            error: "permission denied".to_string(),
        },
        None,
    );
    match history.items().last().unwrap() {
        HistoryItem::FileUnreadable { path, error, .. } => {
            assert_eq!(path, "a.txt");
            assert_eq!(error, "permission denied");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn plan_mode_blocked_is_tool_failed_with_fixed_message() {
    let mut history = History::new();
    append_outcome(&mut history, &call("edit"), DispatchOutcome::PlanModeBlocked, None);
    match history.items().last().unwrap() {
        HistoryItem::ToolFailed { error, .. } => {
            assert_eq!(error, "mutating tools are disabled in plan mode");
        }
        other => panic!("unexpected {other:?}"),
    }
}

struct AlwaysFixes;

#[async_trait]
impl DiffAutofixer for AlwaysFixes {
    async fn fix_search(&self, file_content: &str, _search: &str, _replace: &str) -> Option<String> {
        Some(file_content.to_string())
    }
}

#[tokio::test]
async fn failed_edit_retries_once_through_diff_autofixer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "actual content").await.unwrap();

    let ctx = make_ctx(None);
    let mut registry = octo_tools::ToolRegistry::new();
    registry.register(Box::new(octo_tools::builtin::ReadTool));
    registry.register(Box::new(octo_tools::builtin::EditTool));

    let read_call = ToolCall::new("c1", "read", json!({"path": path.to_str().unwrap()}));
    octo_tools::dispatch(&read_call, &registry, &ctx, &CancellationToken::new()).await;

    let mut history = History::new();
    let edit_call = ToolCall::new(
        "c2",
        "edit",
        json!({"path": path.to_str().unwrap(), "search": "wrong text", "replace": "fixed"}),
    );
    let autofixer = AlwaysFixes;
    dispatch_and_record(
        &mut history,
        &edit_call,
        &registry,
        &ctx,
        Some(&autofixer),
        &CancellationToken::new(),
    )
    .await;

    match history.items().last().unwrap() {
        HistoryItem::FileMutate { path: p, .. } => assert_eq!(p, path.to_str().unwrap()),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "fixed");
}

#[tokio::test]
async fn failed_edit_without_autofixer_stays_failed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "actual content").await.unwrap();

    let ctx = make_ctx(None);
    let mut registry = octo_tools::ToolRegistry::new();
    registry.register(Box::new(octo_tools::builtin::ReadTool));
    registry.register(Box::new(octo_tools::builtin::EditTool));

    let read_call = ToolCall::new("c1", "read", json!({"path": path.to_str().unwrap()}));
    octo_tools::dispatch(&read_call, &registry, &ctx, &CancellationToken::new()).await;

    let mut history = History::new();
    let edit_call = ToolCall::new(
        "c2",
        "edit",
        json!({"path": path.to_str().unwrap(), "search": "wrong text", "replace": "fixed"}),
    );
    dispatch_and_record(&mut history, &edit_call, &registry, &ctx, None, &CancellationToken::new()).await;

    match history.items().last().unwrap() {
        HistoryItem::ToolFailed { error, .. } => assert!(error.contains("search text not found")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn record_tool_reject_appends_tool_reject() {
    let mut history = History::new();
    record_tool_reject(&mut history, &call("shell"));
    match history.items().last().unwrap() {
        HistoryItem::ToolReject { .. } => {}
        other => panic!("unexpected {other:?}"),
    }
}
