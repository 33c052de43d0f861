use crate::view_model::AppViewModel;
use crate::{DisplayState, OutputKind, SubmissionError, SubmissionId, TaskId};

pub const IDLE_LABEL: &str = "Convert";
pub const UPLOADING_LABEL: &str = "Uploading...";
pub const PROCESSING_LABEL: &str = "Processing...";

/// The single submit control shared by submitter and poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            enabled: true,
            label: IDLE_LABEL,
        }
    }
}

/// The task currently owned by the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTask {
    pub task_id: TaskId,
    pub submission: SubmissionId,
    pub output: OutputKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Uploading {
        submission: SubmissionId,
        output: OutputKind,
    },
    Polling(ActiveTask),
}

/// Explicit owner of the submit control and of the in-flight task.
///
/// The control is disabled for the whole upload + polling lifetime, so at
/// most one task is ever in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionSession {
    control: SubmitControl,
    phase: SessionPhase,
    last_submission: SubmissionId,
}

impl SubmissionSession {
    pub fn control(&self) -> SubmitControl {
        self.control
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SessionPhase::Idle
    }

    pub fn active_task(&self) -> Option<&ActiveTask> {
        match &self.phase {
            SessionPhase::Polling(task) => Some(task),
            _ => None,
        }
    }

    /// Whether results for `task_id` should still be acted upon.
    pub fn is_active(&self, task_id: &TaskId) -> bool {
        self.active_task().is_some_and(|task| &task.task_id == task_id)
    }

    /// Whether an upload result for `submission` is still awaited.
    pub fn awaits_upload(&self, submission: SubmissionId) -> bool {
        matches!(self.phase, SessionPhase::Uploading { submission: s, .. } if s == submission)
    }

    /// Disables the control and allocates a new submission id. Callers check
    /// that the control is enabled first.
    pub(crate) fn begin_upload(&mut self, output: OutputKind) -> SubmissionId {
        self.last_submission += 1;
        let submission = self.last_submission;
        self.control = SubmitControl {
            enabled: false,
            label: UPLOADING_LABEL,
        };
        self.phase = SessionPhase::Uploading { submission, output };
        submission
    }

    /// Hands the task to the poller. `reported` overrides the output kind
    /// requested at submission time.
    pub(crate) fn begin_polling(
        &mut self,
        task_id: TaskId,
        reported: Option<OutputKind>,
    ) -> Option<&ActiveTask> {
        let SessionPhase::Uploading { submission, output } = self.phase else {
            return None;
        };
        self.control = SubmitControl {
            enabled: false,
            label: PROCESSING_LABEL,
        };
        self.phase = SessionPhase::Polling(ActiveTask {
            task_id,
            submission,
            output: reported.unwrap_or(output),
        });
        self.active_task()
    }

    /// Returns to idle: control enabled with its default label.
    pub(crate) fn finish(&mut self) {
        self.control = SubmitControl::default();
        self.phase = SessionPhase::Idle;
    }
}

/// How the most recent submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed {
        task_id: TaskId,
        output: OutputKind,
    },
    Failed {
        task_id: TaskId,
        status: String,
        detail: String,
    },
    Warning {
        task_id: TaskId,
        status: String,
        detail: String,
    },
    SubmissionFailed {
        error: SubmissionError,
    },
    PollFailed {
        task_id: TaskId,
        reason: String,
    },
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SubmissionSession,
    display: DisplayState,
    outcome: Option<TaskOutcome>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            control: self.session.control(),
            phase: self.session.phase().clone(),
            display: self.display.clone(),
            outcome: self.outcome.clone(),
            dirty: self.dirty,
        }
    }

    pub fn session(&self) -> &SubmissionSession {
        &self.session
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn outcome(&self) -> Option<&TaskOutcome> {
        self.outcome.as_ref()
    }

    /// Returns whether anything changed since the last call and clears the
    /// flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn session_mut(&mut self) -> &mut SubmissionSession {
        self.dirty = true;
        &mut self.session
    }

    pub(crate) fn set_display(&mut self, display: DisplayState) {
        self.display = display;
        self.dirty = true;
    }

    pub(crate) fn set_outcome(&mut self, outcome: Option<TaskOutcome>) {
        self.outcome = outcome;
        self.dirty = true;
    }
}
