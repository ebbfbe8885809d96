use octo_error::ErrorExt;
use octo_error::StatusCode;
use snafu::Snafu;

/// Errors from talking to an MCP server.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum McpError {
    #[snafu(display("server '{server}' has no tool named '{tool}'"))]
    UnknownTool { server: String, tool: String },

    #[snafu(display("MCP call to '{server}' timed out"))]
    Timeout { server: String },

    #[snafu(display("MCP transport error: {message}"))]
    Transport { message: String },
}

impl ErrorExt for McpError {
    fn status_code(&self) -> StatusCode {
        match self {
            McpError::UnknownTool { .. } => StatusCode::NotFound,
            McpError::Timeout { .. } => StatusCode::NetworkError,
            McpError::Transport { .. } => StatusCode::NetworkError,
        }
    }
}
