use crate::{DisplayState, SessionPhase, SubmitControl, TaskOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub control: SubmitControl,
    pub phase: SessionPhase,
    pub display: DisplayState,
    pub outcome: Option<TaskOutcome>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn is_idle(&self) -> bool {
        self.phase == SessionPhase::Idle
    }
}

/// Render capability handed to the platform loop. Both the upload and the
/// polling stages report through it; nothing else touches the indicator.
pub trait ProgressObserver {
    fn render(&mut self, view: &AppViewModel);
}
