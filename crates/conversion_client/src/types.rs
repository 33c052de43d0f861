use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Multipart upload: one file part plus text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: PathBuf,
    pub file_field: String,
    pub fields: Vec<(String, String)>,
}

/// Parsed body of a 2xx upload response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadReply {
    /// `task_id` as a string; numbers are stringified, empty strings dropped.
    pub task_id: Option<String>,
    pub error: Option<String>,
    pub output_format: Option<String>,
}

impl UploadReply {
    pub(crate) fn from_json(body: &Value) -> Self {
        Self {
            task_id: body.get("task_id").and_then(value_text),
            error: body.get("error").and_then(value_text),
            output_format: body.get("output_format").and_then(value_text),
        }
    }
}

/// Raw fields of one `/progress/{task_id}` response. Defaults are applied by
/// the state machine, not here.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressReport {
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub output_format: Option<String>,
}

impl ProgressReport {
    pub(crate) fn from_json(body: &Value) -> Self {
        Self {
            status: body.get("status").and_then(value_text),
            progress: body.get("progress").and_then(value_number),
            message: body.get("message").and_then(value_text),
            error: body.get("error").and_then(value_text),
            output_format: body.get("output_format").and_then(value_text),
        }
    }
}

/// Which artifact to retrieve once a task completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub task_id: String,
    /// Path segment after the task id, e.g. `audio`.
    pub file_type: String,
    /// Used when the response carries no `Content-Disposition` file name.
    pub fallback_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutput {
    pub path: PathBuf,
    pub byte_len: u64,
    /// Lowercase hex SHA-256 of the saved bytes.
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadCompleted {
        submission: u64,
        result: Result<UploadReply, ClientError>,
    },
    Progress {
        task_id: String,
        tick: u64,
        result: Result<ProgressReport, ClientError>,
    },
    DownloadCompleted {
        task_id: String,
        result: Result<DownloadOutput, ClientError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
    /// The JSON `error` field of a failed response, when one was readable.
    pub server_error: Option<String>,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_error: None,
        }
    }

    pub(crate) fn with_server_error(mut self, server_error: Option<String>) -> Self {
        self.server_error = server_error;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    InvalidResponse,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Io,
    Network,
    /// The engine thread exited; no further events will arrive.
    EngineStopped,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::EngineStopped => write!(f, "engine stopped"),
        }
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(FailureKind::InvalidResponse, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}

/// Extracts the `error` field of a JSON error body, if the body is JSON.
pub(crate) fn server_error_field(body: &[u8]) -> Option<String> {
    json_text_field(body, "error")
}

pub(crate) fn json_text_field(body: &[u8], key: &str) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| json.get(key).and_then(value_text))
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
