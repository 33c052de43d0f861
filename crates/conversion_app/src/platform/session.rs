use std::time::Duration;

use conversion_client::{ClientError, ClientSettings, DownloadOutput, EngineEvent};
use conversion_core::{
    update, AppState, AppViewModel, Effect, Msg, ProgressObserver, TaskOutcome, UploadForm,
};
use conversion_logging::{conv_error, conv_info};

use super::effects::{event_to_msg, EffectRunner};
use super::AppError;

const EVENT_WAIT: Duration = Duration::from_millis(50);

/// How one submit-to-idle run ended.
#[derive(Debug)]
pub struct SessionReport {
    pub outcome: Option<TaskOutcome>,
    /// Result of retrieving the artifact, for completed tasks.
    pub download: Option<Result<DownloadOutput, ClientError>>,
    pub final_view: AppViewModel,
}

impl SessionReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().is_some_and(TaskOutcome::is_success)
            && matches!(self.download, Some(Ok(_)))
    }
}

/// Submits `form` and drives the task to a terminal state.
///
/// Returns once the state machine is idle again and any requested download
/// has finished. Every render goes through `observer`.
pub fn run_session(
    settings: ClientSettings,
    form: UploadForm,
    observer: &mut dyn ProgressObserver,
) -> Result<SessionReport, AppError> {
    let runner = EffectRunner::new(settings)?;
    let mut session = Session {
        state: AppState::new(),
        runner,
        observer,
        pending_downloads: 0,
        download: None,
    };

    session.dispatch(Msg::SubmitClicked(form));
    while !session.is_settled() {
        let Some(event) = session.runner.next_event(EVENT_WAIT)? else {
            continue;
        };
        session.handle_event(event);
    }

    let final_view = session.state.view();
    Ok(SessionReport {
        outcome: final_view.outcome.clone(),
        download: session.download,
        final_view,
    })
}

struct Session<'a> {
    state: AppState,
    runner: EffectRunner,
    observer: &'a mut dyn ProgressObserver,
    pending_downloads: usize,
    download: Option<Result<DownloadOutput, ClientError>>,
}

impl Session<'_> {
    fn is_settled(&self) -> bool {
        self.state.session().is_idle() && self.pending_downloads == 0
    }

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::DownloadCompleted { task_id, result } => {
                self.pending_downloads = self.pending_downloads.saturating_sub(1);
                match &result {
                    Ok(output) => conv_info!(
                        "Task {} saved to {:?} ({} bytes, sha256 {})",
                        task_id,
                        output.path,
                        output.byte_len,
                        output.sha256
                    ),
                    Err(err) => conv_error!("Download for task {} failed: {}", task_id, err),
                }
                self.download = Some(result);
            }
            other => {
                if let Some(msg) = event_to_msg(other) {
                    self.dispatch(msg);
                }
            }
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.observer.render(&state.view());
        }
        self.state = state;

        self.pending_downloads += effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Download { .. }))
            .count();
        self.runner.enqueue(effects);
    }
}
