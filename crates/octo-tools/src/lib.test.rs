use super::*;
use async_trait::async_trait;
use octo_protocol::DirEntry;
use octo_protocol::ShellOutput;
use serde_json::json;
use std::path::Path;
use std::path::PathBuf;

struct LocalTransport;

#[async_trait]
impl Transport for LocalTransport {
    async fn shell(&self, _signal: &CancellationToken, cmd: &str, _timeout_ms: u64) -> std::io::Result<ShellOutput> {
        let output = tokio::process::Command::new("sh").arg("-c").arg(cmd).output().await?;
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ShellOutput {
            output: combined,
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

fn make_ctx(mode: Mode) -> ToolContext {
    ToolContext {
        transport: Arc::new(LocalTransport),
        tracker: Arc::new(FileTracker::new()),
        mode,
        mcp_clients: HashMap::new(),
        plan_file_path: None,
        context_window_tokens: 4096,
        web_search_client: None,
        task_runner: None,
        skills_dir: None,
        abort: CancellationToken::new(),
    }
}

fn abort_token() -> CancellationToken {
    CancellationToken::new()
}

fn registry_with_all_builtins() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(builtin::ReadTool));
    registry.register(Box::new(builtin::ListTool));
    registry.register(Box::new(builtin::ShellTool));
    registry.register(Box::new(builtin::EditTool));
    registry.register(Box::new(builtin::CreateTool));
    registry.register(Box::new(builtin::AppendTool));
    registry.register(Box::new(builtin::PrependTool));
    registry.register(Box::new(builtin::RewriteTool));
    registry
}

#[tokio::test]
async fn read_tool_returns_content_and_line_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "one\ntwo\n").await.unwrap();

    let ctx = make_ctx(Mode::Unchained);
    let registry = registry_with_all_builtins();
    let call = ToolCall::new("c1", "read", json!({"path": path.to_str().unwrap()}));
    match dispatch(&call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::Output(out) => {
            assert_eq!(out.content, "one\ntwo\n");
            assert_eq!(out.lines, Some(2));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn edit_without_prior_read_is_file_outdated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let ctx = make_ctx(Mode::Unchained);
    let registry = registry_with_all_builtins();
    let call = ToolCall::new(
        "c1",
        "edit",
        json!({"path": path.to_str().unwrap(), "search": "foo", "replace": "bar"}),
    );
    match dispatch(&call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::FileOutdated { .. } => {}
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn read_then_edit_succeeds_and_updates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let ctx = make_ctx(Mode::Unchained);
    let registry = registry_with_all_builtins();

    let read_call = ToolCall::new("c1", "read", json!({"path": path.to_str().unwrap()}));
    dispatch(&read_call, &registry, &ctx, &abort_token()).await;

    let edit_call = ToolCall::new(
        "c2",
        "edit",
        json!({"path": path.to_str().unwrap(), "search": "foo", "replace": "baz"}),
    );
    match dispatch(&edit_call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::Output(_) => {}
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "baz");
}

#[tokio::test]
async fn edit_with_missing_search_text_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let ctx = make_ctx(Mode::Unchained);
    let registry = registry_with_all_builtins();
    let read_call = ToolCall::new("c1", "read", json!({"path": path.to_str().unwrap()}));
    dispatch(&read_call, &registry, &ctx, &abort_token()).await;

    let edit_call = ToolCall::new(
        "c2",
        "edit",
        json!({"path": path.to_str().unwrap(), "search": "nope", "replace": "baz"}),
    );
    match dispatch(&edit_call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::Failed(msg) => assert!(msg.contains("search text not found")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn create_on_existing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "foo").await.unwrap();

    let ctx = make_ctx(Mode::Unchained);
    let registry = registry_with_all_builtins();
    let call = ToolCall::new("c1", "create", json!({"path": path.to_str().unwrap(), "content": "x"}));
    match dispatch(&call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::Failed(msg) => assert!(msg.contains("already exists")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_unknown_tool_is_malformed() {
    let ctx = make_ctx(Mode::Unchained);
    let registry = registry_with_all_builtins();
    let call = ToolCall::new("c1", "nonexistent", json!({}));
    match dispatch(&call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::Malformed(msg) => assert!(msg.contains("nonexistent")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn plan_mode_blocks_mutating_tools() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");

    let ctx = make_ctx(Mode::Plan);
    let registry = registry_with_all_builtins();
    let call = ToolCall::new("c1", "create", json!({"path": path.to_str().unwrap(), "content": "x"}));
    match dispatch(&call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::PlanModeBlocked => {}
        other => panic!("unexpected {other:?}"),
    }
    assert!(tokio::fs::metadata(&path).await.is_err());
}

#[tokio::test]
async fn shell_nonzero_exit_is_failed_with_code_and_output() {
    let ctx = make_ctx(Mode::Unchained);
    let registry = registry_with_all_builtins();
    let call = ToolCall::new("c1", "shell", json!({"cmd": "exit 3", "timeoutMs": 1000}));
    match dispatch(&call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::Failed(msg) => assert!(msg.contains("code 3")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn confirmation_policy_matches_mutating_tools_in_collaboration_mode() {
    assert!(requires_confirmation("shell", Mode::Collaboration));
    assert!(requires_confirmation("edit", Mode::Collaboration));
    assert!(!requires_confirmation("read", Mode::Collaboration));
    assert!(!requires_confirmation("shell", Mode::Unchained));
}

#[tokio::test]
async fn write_plan_tool_requires_bound_path() {
    let ctx = make_ctx(Mode::Plan);
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(builtin::WritePlanTool));
    let call = ToolCall::new("c1", "write-plan", json!({"content": "1. step one"}));
    match dispatch(&call, &registry, &ctx, &abort_token()).await {
        DispatchOutcome::Failed(msg) => assert!(msg.contains("no plan file")),
        other => panic!("unexpected {other:?}"),
    }
}
