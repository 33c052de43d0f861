use thiserror::Error;

pub const MISSING_TASK_ID_MESSAGE: &str = "No task ID received from server.";

/// Why an upload did not yield a task to poll.
///
/// The `Display` text is what the indicator shows after the
/// `"Submission failed: "` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// The request never produced a response (connection refused, timeout,
    /// unreadable upload file).
    #[error("{message}")]
    Transport { message: String },
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// 2xx response without a usable `task_id`.
    #[error("{message}")]
    MissingTaskId { message: String },
}

impl SubmissionError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// `error` is the server's JSON `error` field, if it could be parsed.
    pub fn rejected(status: u16, error: Option<String>) -> Self {
        let message = error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {status}"));
        Self::Rejected { status, message }
    }

    pub fn missing_task_id(error: Option<String>) -> Self {
        let message = error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| MISSING_TASK_ID_MESSAGE.to_string());
        Self::MissingTaskId { message }
    }
}
