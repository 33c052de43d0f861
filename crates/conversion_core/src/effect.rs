use crate::{OutputKind, SubmissionId, TaskId, UploadForm};

/// Side effects requested by [`crate::update`]; executed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the form to the upload endpoint.
    SendUpload {
        submission: SubmissionId,
        form: UploadForm,
    },
    /// Arm the poll timer for `task_id`, cancelling any previous timer first.
    StartPolling { task_id: TaskId },
    /// Cancel the poll timer for `task_id`.
    StopPolling { task_id: TaskId },
    /// Retrieve `/download/{task_id}/{output}`.
    Download { task_id: TaskId, output: OutputKind },
}
