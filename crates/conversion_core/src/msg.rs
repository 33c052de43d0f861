use std::path::PathBuf;

use crate::{OutputKind, ProgressSnapshot, SubmissionError, SubmissionId, TaskId};

/// Default multipart field name for the uploaded document.
pub const DEFAULT_FILE_FIELD: &str = "pdf_file";

/// Form data packaged by the submitter: one file part plus text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub file: PathBuf,
    pub file_field: String,
    pub fields: Vec<(String, String)>,
}

impl UploadForm {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            file_field: DEFAULT_FILE_FIELD.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn with_file_field(mut self, name: impl Into<String>) -> Self {
        self.file_field = name.into();
        self
    }

    /// Adds a text field, replacing an earlier field of the same name.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Output kind requested through the `output_format` field.
    pub fn output_kind(&self) -> Option<OutputKind> {
        self.field("output_format").and_then(OutputKind::parse)
    }
}

/// Successful upload: the backend accepted the job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAccepted {
    pub task_id: TaskId,
    /// Output kind echoed by the server, when it reports one.
    pub output: Option<OutputKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User pressed the submit control with the given form.
    SubmitClicked(UploadForm),
    /// Upload request finished, successfully or not.
    UploadFinished {
        submission: SubmissionId,
        result: Result<UploadAccepted, SubmissionError>,
    },
    /// One poll tick returned a status.
    ProgressReceived {
        task_id: TaskId,
        snapshot: ProgressSnapshot,
    },
    /// One poll tick failed at the transport or HTTP layer.
    ProgressFailed { task_id: TaskId, reason: String },
}
