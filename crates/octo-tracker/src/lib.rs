//! Per-absolute-path last-observed-mtime map, enforcing read-before-edit.
//!
//! The LLM only "sees" a file via a prior read. If the user (or another
//! tool) modified it after, edits produced from the stale view are silently
//! wrong. This tracker turns that situation into a recoverable protocol
//! error ([`TrackerError::Outdated`]) instead of a silent corruption.

mod error;

pub use error::TrackerError;

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use snafu::IntoError;
use tokio::sync::Mutex;

type Result<T> = std::result::Result<T, TrackerError>;

/// Tracks the last mtime this process observed for each absolute path.
#[derive(Default)]
pub struct FileTracker {
    observed: Mutex<HashMap<PathBuf, SystemTime>>,
}

impl FileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path`, recording its current mtime, and return the content.
    pub async fn read(&self, path: &Path) -> Result<String> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| {
                error::tracker_error::FileUnreadableSnafu {
                    path: path.to_path_buf(),
                }
                .into_error(source)
            })?;
        let mtime = mtime_of(path).await?;
        self.observed.lock().await.insert(path.to_path_buf(), mtime);
        Ok(content)
    }

    /// Write `content` to `path`, creating parent directories first, then
    /// record the post-write mtime as the new baseline.
    pub async fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    error::tracker_error::FileUnreadableSnafu {
                        path: path.to_path_buf(),
                    }
                    .into_error(source)
                })?;
            }
        }
        tokio::fs::write(path, content).await.map_err(|source| {
            error::tracker_error::FileUnreadableSnafu {
                path: path.to_path_buf(),
            }
            .into_error(source)
        })?;
        let mtime = mtime_of(path).await?;
        self.observed.lock().await.insert(path.to_path_buf(), mtime);
        Ok(())
    }

    /// Fail with [`TrackerError::Outdated`] unless `path` was read (or written
    /// by this tracker) and its on-disk mtime has not advanced since.
    pub async fn assert_can_edit(&self, path: &Path) -> Result<()> {
        let observed = self.observed.lock().await.get(path).copied();
        let Some(observed) = observed else {
            return Err(error::tracker_error::OutdatedSnafu {
                path: path.to_path_buf(),
                reason: "never read".to_string(),
            }
            .build());
        };
        let current = mtime_of(path).await?;
        if current > observed {
            return Err(error::tracker_error::OutdatedSnafu {
                path: path.to_path_buf(),
                reason: "modified on disk since last read".to_string(),
            }
            .build());
        }
        Ok(())
    }

    /// Fail with [`TrackerError::Exists`] if `path` already exists on disk.
    pub async fn assert_can_create(&self, path: &Path) -> Result<()> {
        if tokio::fs::metadata(path).await.is_ok() {
            return Err(error::tracker_error::ExistsSnafu {
                path: path.to_path_buf(),
            }
            .build());
        }
        Ok(())
    }

    /// Forget everything this tracker has observed (used by history windowing).
    pub async fn clear(&self) {
        self.observed.lock().await.clear();
    }
}

async fn mtime_of(path: &Path) -> Result<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .map_err(|source| {
            error::tracker_error::FileUnreadableSnafu {
                path: path.to_path_buf(),
            }
            .into_error(source)
        })
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
