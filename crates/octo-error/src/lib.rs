//! Shared error classification used across the agent core.
//!
//! Every domain error (tool, transport, provider) carries a [`StatusCode`]
//! so the loop can decide whether to retry, surface a dedicated screen, or
//! just append a `tool-failed` history item and move on.

mod status_code;

pub use status_code::StatusCategory;
pub use status_code::StatusCode;

/// Common behavior all domain error enums expose.
pub trait ErrorExt: std::error::Error {
    /// Classify this error for retry/logging decisions.
    fn status_code(&self) -> StatusCode;

    /// Whether the failure is worth retrying without user intervention.
    fn is_retryable(&self) -> bool {
        self.status_code().meta().retryable
    }

    /// Message safe to show the model or the user. Internal errors are
    /// redacted to their status code; everything else is shown verbatim.
    fn output_msg(&self) -> String {
        if self.status_code() == StatusCode::Internal {
            format!("Internal error: {}", self.status_code() as i32)
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, snafu::Snafu)]
    #[snafu(display("boom: {message}"))]
    struct Boom {
        message: String,
    }

    impl ErrorExt for Boom {
        fn status_code(&self) -> StatusCode {
            StatusCode::Internal
        }
    }

    #[test]
    fn internal_errors_redact_output_msg() {
        let err = Boom {
            message: "secret path /etc/shadow".into(),
        };
        assert_eq!(err.output_msg(), "Internal error: 1000");
    }
}
