//! Wire-neutral data model shared by every crate in the agent core.
//!
//! This crate owns the types that cross module boundaries: the
//! [`SequenceId`] ordering primitive, the [`Mode`] enum that drives
//! confirmation policy, the [`ToolCall`] correlation type, and the
//! append-only [`HistoryItem`] log entries described in the history model.

mod history_item;
mod mode;
mod sequence;
mod tool_call;
mod transport;
mod usage;

pub use history_item::HistoryItem;
pub use mode::Mode;
pub use sequence::SequenceId;
pub use sequence::SequenceIdGenerator;
pub use tool_call::ToolCall;
pub use transport::DirEntry;
pub use transport::ShellOutput;
pub use transport::Transport;
pub use usage::TokenUsage;
