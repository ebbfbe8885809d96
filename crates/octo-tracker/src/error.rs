use std::path::PathBuf;

use octo_error::ErrorExt;
use octo_error::StatusCode;
use snafu::Snafu;

/// Errors raised by the file consistency tracker.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)), module)]
pub enum TrackerError {
    /// An edit was attempted on a file that was never read, or that changed
    /// on disk since it was last read.
    #[snafu(display("{} is outdated: {reason}", path.display()))]
    Outdated { path: PathBuf, reason: String },

    /// A create was attempted on a path that already exists.
    #[snafu(display("{} already exists", path.display()))]
    Exists { path: PathBuf },

    /// The underlying filesystem call failed.
    #[snafu(display("{} could not be read", path.display()))]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ErrorExt for TrackerError {
    fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::Outdated { .. } => StatusCode::FileOutdated,
            TrackerError::Exists { .. } => StatusCode::FileExists,
            TrackerError::FileUnreadable { .. } => StatusCode::FileUnreadable,
        }
    }
}
