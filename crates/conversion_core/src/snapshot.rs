use std::fmt;

/// Monotonic counter identifying one press of the submit control.
pub type SubmissionId = u64;

/// Opaque task identifier issued by the backend for one conversion job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TaskId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Kind of artifact the backend produces for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    #[default]
    Audio,
    Pdf,
}

impl OutputKind {
    /// Parses the backend's `output_format` spelling, ignoring ASCII case.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("audio") {
            Some(Self::Audio)
        } else if raw.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    /// Path segment used in `/download/{task_id}/{kind}`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Pdf => "pdf",
        }
    }

    /// Extension for a saved file when the server does not name it.
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Audio => "mp3",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduced view of one `/progress/{task_id}` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub status: String,
    pub progress: u8,
    pub message: String,
    pub output: Option<OutputKind>,
}

impl ProgressSnapshot {
    /// Applies the response defaults: a missing or empty status becomes
    /// `"Unknown"`, a missing progress becomes 0, and `message` falls back to
    /// `error` and then to the empty string.
    pub fn from_fields(
        status: Option<String>,
        progress: Option<f64>,
        message: Option<String>,
        error: Option<String>,
    ) -> Self {
        let status = status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let message = message
            .filter(|m| !m.is_empty())
            .or_else(|| error.filter(|e| !e.is_empty()))
            .unwrap_or_default();
        Self {
            status,
            progress: normalize_percent(progress),
            message,
            output: None,
        }
    }

    pub fn with_output(mut self, output: Option<OutputKind>) -> Self {
        self.output = output;
        self
    }
}

/// Rounds a raw percentage and clamps it into `0..=100`. Missing or
/// non-finite values map to 0.
pub fn normalize_percent(raw: Option<f64>) -> u8 {
    match raw {
        Some(value) if value.is_finite() => value.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}
