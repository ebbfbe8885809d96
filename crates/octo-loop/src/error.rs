use octo_error::ErrorExt;
use octo_error::StatusCode;
use snafu::Snafu;

/// Errors the agent loop itself can raise, distinct from tool/dispatch
/// errors (those are folded into history items, not propagated as `Err`).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum LoopError {
    #[snafu(display("completion stream failed: {message}"))]
    Stream { message: String },

    #[snafu(display("windowing could not reach the minimum context budget"))]
    WindowBudgetUnreachable,

    #[snafu(display("compaction failed: {message}"))]
    Compaction { message: String },
}

impl ErrorExt for LoopError {
    fn status_code(&self) -> StatusCode {
        match self {
            LoopError::Stream { .. } => StatusCode::ProviderError,
            LoopError::WindowBudgetUnreachable => StatusCode::Internal,
            LoopError::Compaction { .. } => StatusCode::ProviderError,
        }
    }
}
