//! Local workspace [`Transport`]: plain `tokio::fs` / `tokio::process`
//! against the real filesystem, rooted at the directory Octo was started in.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use octo_protocol::DirEntry;
use octo_protocol::ShellOutput;
use octo_protocol::Transport;
use tokio_util::sync::CancellationToken;

pub struct LocalTransport {
    root: PathBuf,
}

impl LocalTransport {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn shell(&self, signal: &CancellationToken, cmd: &str, timeout_ms: u64) -> std::io::Result<ShellOutput> {
        let child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .current_dir(&self.root)
            .kill_on_drop(true)
            .spawn()?;

        let output = tokio::select! {
            biased;
            _ = signal.cancelled() => {
                return Err(std::io::Error::new(std::io::ErrorKind::Interrupted, "command cancelled"));
            }
            result = tokio::time::timeout(Duration::from_millis(timeout_ms), child.wait_with_output()) => {
                result.map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "command timed out"))??
            }
        };

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
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, content).await
    }

    async fn read_file(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn is_directory(&self, _signal: &CancellationToken, path: &Path) -> bool {
        tokio::fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
    }

    async fn readdir(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<Vec<DirEntry>> {
        let mut read_dir = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let is_directory = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn mod_time(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<std::time::SystemTime> {
        tokio::fs::metadata(path).await?.modified()
    }

    async fn resolve_path(&self, _signal: &CancellationToken, path: &Path) -> std::io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.root.join(path))
        }
    }

    async fn cwd(&self, _signal: &CancellationToken) -> std::io::Result<PathBuf> {
        Ok(self.root.clone())
    }

    async fn close(&self) {}
}
