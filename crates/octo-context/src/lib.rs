//! Per-turn auxiliary context: open files, open directories, and an open
//! plan, rebuilt fresh every turn from on-disk state so the model never
//! acts on a stale copy (§4.G).
//!
//! The set of *which* paths are open is derived from the history log and
//! "windowed" the same way the rolling history is: once history trims an
//! item older than some sequence id, the paths it introduced drop out too.
//! The *content* of each open entry, however, is never taken from history —
//! it is re-read through the [`Transport`] every time [`ContextSpace::render`]
//! is called.

use std::collections::BTreeMap;

use octo_protocol::HistoryItem;
use octo_protocol::SequenceId;
use octo_protocol::Transport;
use tokio_util::sync::CancellationToken;

/// Tracks which paths are "open" and the most recent sequence id that
/// touched each one.
#[derive(Debug, Default, Clone)]
pub struct ContextSpace {
    open_files: BTreeMap<String, SequenceId>,
    open_directories: BTreeMap<String, SequenceId>,
    open_plan: Option<(String, SequenceId)>,
}

impl ContextSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan a batch of newly-appended history items and register any file,
    /// directory, or plan touches they record. Safe to call incrementally
    /// as the loop appends, or once over a whole log.
    pub fn observe(&mut self, items: &[HistoryItem]) {
        for item in items {
            match item {
                HistoryItem::FileRead { id, path, .. }
                | HistoryItem::FileMutate { id, path, .. }
                | HistoryItem::FileOutdated { id, path, .. }
                | HistoryItem::FileUnreadable { id, path, .. } => {
                    upsert_latest(&mut self.open_files, path.clone(), *id);
                }
                HistoryItem::ToolOutput { id, tool_call, .. } if tool_call.name == "list" => {
                    if let Some(path) = tool_call.arguments.get("path").and_then(|v| v.as_str()) {
                        upsert_latest(&mut self.open_directories, path.to_string(), *id);
                    }
                }
                HistoryItem::PlanWritten {
                    id, plan_file_path, ..
                } => {
                    self.open_plan = Some((plan_file_path.clone(), *id));
                }
                _ => {}
            }
        }
    }

    /// Drop every open entry whose introducing sequence id fell below the
    /// history's new floor. Called whenever the rolling window or a
    /// compaction trims the log.
    pub fn window(&mut self, min_seq: SequenceId) {
        self.open_files.retain(|_, seq| *seq >= min_seq);
        self.open_directories.retain(|_, seq| *seq >= min_seq);
        if let Some((_, seq)) = &self.open_plan {
            if *seq < min_seq {
                self.open_plan = None;
            }
        }
    }

    /// Re-read every open file and directory from disk through `transport`
    /// and assemble the block injected after history for this turn.
    pub async fn render(&self, transport: &dyn Transport, signal: &CancellationToken) -> ContextBlock {
        let mut files = Vec::new();
        for path in self.open_files.keys() {
            let entry = match transport.read_file(signal, path.as_ref()).await {
                Ok(content) => OpenFile {
                    path: path.clone(),
                    content: Some(content),
                },
                Err(_) => OpenFile {
                    path: path.clone(),
                    content: None,
                },
            };
            files.push(entry);
        }

        let mut directories = Vec::new();
        for path in self.open_directories.keys() {
            let entries = transport
                .readdir(signal, path.as_ref())
                .await
                .unwrap_or_default()
                .into_iter()
                .map(|e| e.name)
                .collect();
            directories.push(OpenDirectory {
                path: path.clone(),
                entries,
            });
        }

        let plan = match &self.open_plan {
            Some((path, _)) => {
                let content = transport.read_file(signal, path.as_ref()).await.ok();
                Some(OpenPlan {
                    path: path.clone(),
                    content,
                })
            }
            None => None,
        };

        ContextBlock {
            files,
            directories,
            plan,
        }
    }
}

fn upsert_latest(map: &mut BTreeMap<String, SequenceId>, key: String, seq: SequenceId) {
    map.entry(key)
        .and_modify(|existing| {
            if seq > *existing {
                *existing = seq;
            }
        })
        .or_insert(seq);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub path: String,
    /// `None` if the file could no longer be read (deleted, permissions).
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDirectory {
    pub path: String,
    pub entries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPlan {
    pub path: String,
    pub content: Option<String>,
}

/// The rendered per-turn block, ready to be appended to the prompt after
/// the compiled history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBlock {
    pub files: Vec<OpenFile>,
    pub directories: Vec<OpenDirectory>,
    pub plan: Option<OpenPlan>,
}

impl ContextBlock {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_empty() && self.plan.is_none()
    }

    /// Render as the plain-text block injected after history.
    pub fn to_prompt_text(&self) -> String {
        let mut out = String::new();
        for file in &self.files {
            match &file.content {
                Some(content) => {
                    out.push_str(&format!("<open-file path=\"{}\">\n{content}\n</open-file>\n", file.path));
                }
                None => {
                    out.push_str(&format!("<open-file path=\"{}\" unreadable=\"true\" />\n", file.path));
                }
            }
        }
        for dir in &self.directories {
            out.push_str(&format!(
                "<open-directory path=\"{}\">\n{}\n</open-directory>\n",
                dir.path,
                dir.entries.join("\n")
            ));
        }
        if let Some(plan) = &self.plan {
            match &plan.content {
                Some(content) => {
                    out.push_str(&format!("<open-plan path=\"{}\">\n{content}\n</open-plan>\n", plan.path));
                }
                None => {
                    out.push_str(&format!("<open-plan path=\"{}\" unreadable=\"true\" />\n", plan.path));
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
