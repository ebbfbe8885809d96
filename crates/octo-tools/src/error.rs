use octo_error::ErrorExt;
use octo_error::StatusCode;
use snafu::Snafu;

/// Errors a tool can raise during validation or execution.
///
/// These map onto the dispatch algorithm's §4.C outcomes: `NotFound` and
/// `Malformed` become `tool-malformed`; everything else becomes either a
/// `tool-failed` or one of the specialized file-* history items.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum ToolError {
    #[snafu(display("no tool named {name}"))]
    NotFound { name: String },

    #[snafu(display("arguments did not match the schema for {tool_name}: {reason}"))]
    Malformed { tool_name: String, reason: String },

    #[snafu(display("{message}"))]
    Domain { message: String },

    #[snafu(display("{} is outdated: {reason}", path))]
    FileOutdated { path: String, reason: String },

    #[snafu(display("{path} already exists"))]
    FileExists { path: String },

    #[snafu(display("{path} could not be read: {reason}"))]
    FileUnreadable { path: String, reason: String },

    #[snafu(display("mutating tools are disabled in plan mode"))]
    PlanModeBlocked,
}

impl ErrorExt for ToolError {
    fn status_code(&self) -> StatusCode {
        match self {
            ToolError::NotFound { .. } => StatusCode::NotFound,
            ToolError::Malformed { .. } => StatusCode::InvalidArguments,
            ToolError::Domain { .. } | ToolError::PlanModeBlocked => StatusCode::ToolExecution,
            ToolError::FileOutdated { .. } => StatusCode::FileOutdated,
            ToolError::FileExists { .. } => StatusCode::FileExists,
            ToolError::FileUnreadable { .. } => StatusCode::FileUnreadable,
        }
    }
}

impl From<octo_tracker::TrackerError> for ToolError {
    fn from(err: octo_tracker::TrackerError) -> Self {
        match err {
            octo_tracker::TrackerError::Outdated { path, reason } => ToolError::FileOutdated {
                path: path.display().to_string(),
                reason,
            },
            octo_tracker::TrackerError::Exists { path } => ToolError::FileExists {
                path: path.display().to_string(),
            },
            octo_tracker::TrackerError::FileUnreadable { path, source } => {
                ToolError::FileUnreadable {
                    path: path.display().to_string(),
                    reason: source.to_string(),
                }
            }
        }
    }
}
