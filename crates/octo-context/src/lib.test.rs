use super::*;
use async_trait::async_trait;
use octo_protocol::DirEntry;
use octo_protocol::ToolCall;
use tokio_util::sync::CancellationToken;
use serde_json::json;
use std::path::Path;
use std::path::PathBuf;

/// Bare tokio::fs-backed transport, good enough to exercise the context
/// space's re-read behavior without a real workspace implementation.
struct LocalTransport;

#[async_trait]
impl Transport for LocalTransport {
    async fn shell(&self, _signal: &CancellationToken, _cmd: &str, _timeout_ms: u64) -> std::io::Result<octo_protocol::ShellOutput> {
        unimplemented!()
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
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
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

fn file_read(id: u64, path: &str) -> HistoryItem {
    HistoryItem::FileRead {
        id: SequenceId::from_raw(id),
        tool_call: ToolCall::new(format!("call-{id}"), "read", json!({"path": path})),
        path: path.to_string(),
        content: String::new(),
    }
}

#[test]
fn observe_registers_latest_sequence_per_path() {
    let mut space = ContextSpace::new();
    space.observe(&[file_read(1, "a.txt"), file_read(5, "a.txt")]);
    assert_eq!(
        space.open_files.get("a.txt").copied(),
        Some(SequenceId::from_raw(5))
    );
}

#[test]
fn window_drops_paths_below_floor() {
    let mut space = ContextSpace::new();
    space.observe(&[file_read(1, "a.txt"), file_read(5, "b.txt")]);
    space.window(SequenceId::from_raw(3));
    assert!(!space.open_files.contains_key("a.txt"));
    assert!(space.open_files.contains_key("b.txt"));
}

#[test]
fn list_tool_output_registers_open_directory() {
    let mut space = ContextSpace::new();
    let item = HistoryItem::ToolOutput {
        id: SequenceId::from_raw(2),
        tool_call: ToolCall::new("call-2", "list", json!({"path": "src"})),
        content: "a.rs\nb.rs\n".into(),
        lines: Some(2),
    };
    space.observe(&[item]);
    assert!(space.open_directories.contains_key("src"));
}

#[test]
fn plan_written_sets_open_plan_and_overwrites_on_rewrite() {
    let mut space = ContextSpace::new();
    space.observe(&[HistoryItem::PlanWritten {
        id: SequenceId::from_raw(1),
        plan_file_path: "PLAN.md".into(),
        content: "1. do a thing".into(),
    }]);
    assert_eq!(space.open_plan.as_ref().unwrap().0, "PLAN.md");

    space.observe(&[HistoryItem::PlanWritten {
        id: SequenceId::from_raw(4),
        plan_file_path: "PLAN.md".into(),
        content: "1. do a different thing".into(),
    }]);
    assert_eq!(space.open_plan.as_ref().unwrap().1, SequenceId::from_raw(4));
}

#[tokio::test]
async fn render_re_reads_open_file_from_disk_authoritatively() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    tokio::fs::write(&path, "original").await.unwrap();

    let mut space = ContextSpace::new();
    space.observe(&[file_read(1, path.to_str().unwrap())]);

    tokio::fs::write(&path, "edited externally").await.unwrap();

    let transport = LocalTransport;
    let block = space.render(&transport, &CancellationToken::new()).await;
    assert_eq!(block.files.len(), 1);
    assert_eq!(block.files[0].content.as_deref(), Some("edited externally"));
}

#[tokio::test]
async fn render_marks_deleted_file_unreadable_instead_of_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.txt");
    tokio::fs::write(&path, "x").await.unwrap();

    let mut space = ContextSpace::new();
    space.observe(&[file_read(1, path.to_str().unwrap())]);
    tokio::fs::remove_file(&path).await.unwrap();

    let transport = LocalTransport;
    let block = space.render(&transport, &CancellationToken::new()).await;
    assert_eq!(block.files[0].content, None);
    assert!(block.to_prompt_text().contains("unreadable=\"true\""));
}

#[tokio::test]
async fn render_lists_directory_entries() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("a.rs"), "").await.unwrap();
    tokio::fs::write(dir.path().join("b.rs"), "").await.unwrap();

    let mut space = ContextSpace::new();
    let item = HistoryItem::ToolOutput {
        id: SequenceId::from_raw(1),
        tool_call: ToolCall::new("call-1", "list", json!({"path": dir.path().to_str().unwrap()})),
        content: String::new(),
        lines: None,
    };
    space.observe(&[item]);

    let transport = LocalTransport;
    let block = space.render(&transport, &CancellationToken::new()).await;
    assert_eq!(block.directories.len(), 1);
    assert_eq!(block.directories[0].entries.len(), 2);
}
