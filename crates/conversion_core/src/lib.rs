//! Conversion core: pure task-lifecycle state machine and view-model helpers.
mod display;
mod effect;
mod error;
mod msg;
mod snapshot;
mod state;
mod status;
mod update;
mod view_model;

pub use display::{render_state, DisplayState, Tone};
pub use effect::Effect;
pub use error::{SubmissionError, MISSING_TASK_ID_MESSAGE};
pub use msg::{Msg, UploadAccepted, UploadForm, DEFAULT_FILE_FIELD};
pub use snapshot::{normalize_percent, OutputKind, ProgressSnapshot, SubmissionId, TaskId};
pub use state::{
    ActiveTask, AppState, SessionPhase, SubmissionSession, SubmitControl, TaskOutcome,
    IDLE_LABEL, PROCESSING_LABEL, UPLOADING_LABEL,
};
pub use status::TaskStatus;
pub use update::{terminal_message, update, POLL_FAILURE_MESSAGE};
pub use view_model::{AppViewModel, ProgressObserver};
