use std::path::Path;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// One entry returned by [`Transport::readdir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// Combined stdout/stderr and exit status of a [`Transport::shell`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub output: String,
    pub exit_code: i32,
}

/// The filesystem/shell boundary the core talks through.
///
/// Implemented externally for a local workspace (plain `tokio::fs` /
/// `tokio::process`) or a remote one (SSH, container exec, ...); the core
/// itself never assumes which. Every method takes a cancellation signal so
/// a user-triggered abort can cut off an in-flight subprocess or read (§5,
/// §6).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn shell(&self, signal: &CancellationToken, cmd: &str, timeout_ms: u64) -> std::io::Result<ShellOutput>;
    async fn mkdir(&self, signal: &CancellationToken, path: &Path) -> std::io::Result<()>;
    async fn path_exists(&self, signal: &CancellationToken, path: &Path) -> bool;
    async fn write_file(&self, signal: &CancellationToken, path: &Path, content: &str) -> std::io::Result<()>;
    async fn read_file(&self, signal: &CancellationToken, path: &Path) -> std::io::Result<String>;
    async fn is_directory(&self, signal: &CancellationToken, path: &Path) -> bool;
    async fn readdir(&self, signal: &CancellationToken, path: &Path) -> std::io::Result<Vec<DirEntry>>;
    async fn mod_time(&self, signal: &CancellationToken, path: &Path) -> std::io::Result<std::time::SystemTime>;
    async fn resolve_path(&self, signal: &CancellationToken, path: &Path) -> std::io::Result<PathBuf>;
    async fn cwd(&self, signal: &CancellationToken) -> std::io::Result<PathBuf>;
    /// Releases any held resources (subprocess handles, connections). A
    /// no-op for a purely local transport.
    async fn close(&self);
}
