use crate::{
    render_state, AppState, DisplayState, Effect, Msg, ProgressSnapshot, TaskId, TaskOutcome,
    TaskStatus,
};

pub const POLL_FAILURE_MESSAGE: &str = "Could not retrieve progress.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitClicked(form) => {
            // A disabled control ignores the click and leaves the state untouched.
            if !state.session().control().enabled {
                return (state, Vec::new());
            }
            let requested = form.output_kind().unwrap_or_default();
            let submission = state.session_mut().begin_upload(requested);
            state.set_display(DisplayState::uploading());
            state.set_outcome(None);
            vec![Effect::SendUpload { submission, form }]
        }
        Msg::UploadFinished { submission, result } => {
            if !state.session().awaits_upload(submission) {
                return (state, Vec::new());
            }
            match result {
                Ok(accepted) => {
                    let task_id = state
                        .session_mut()
                        .begin_polling(accepted.task_id, accepted.output)
                        .map(|task| task.task_id.clone());
                    state.set_display(render_state("Initializing", 0, ""));
                    task_id
                        .map(|task_id| vec![Effect::StartPolling { task_id }])
                        .unwrap_or_default()
                }
                Err(error) => {
                    state.set_display(DisplayState::error(format!("Submission failed: {error}")));
                    state.session_mut().finish();
                    state.set_outcome(Some(TaskOutcome::SubmissionFailed { error }));
                    Vec::new()
                }
            }
        }
        Msg::ProgressReceived { task_id, snapshot } => {
            apply_snapshot(&mut state, task_id, snapshot)
        }
        Msg::ProgressFailed { task_id, reason } => {
            if !state.session().is_active(&task_id) {
                return (state, Vec::new());
            }
            state.set_display(DisplayState::error(POLL_FAILURE_MESSAGE));
            state.session_mut().finish();
            state.set_outcome(Some(TaskOutcome::PollFailed {
                task_id: task_id.clone(),
                reason,
            }));
            vec![Effect::StopPolling { task_id }]
        }
    };

    (state, effects)
}

fn apply_snapshot(
    state: &mut AppState,
    task_id: TaskId,
    snapshot: ProgressSnapshot,
) -> Vec<Effect> {
    // Results from a timer that belonged to an earlier task are dropped.
    let Some(active) = state.session().active_task().cloned() else {
        return Vec::new();
    };
    if active.task_id != task_id {
        return Vec::new();
    }

    let ProgressSnapshot {
        status,
        progress,
        message,
        output,
    } = snapshot;
    state.set_display(render_state(&status, progress, &message));

    let classified = TaskStatus::classify(&status, &message);
    if !classified.is_terminal() {
        return Vec::new();
    }

    let mut effects = vec![Effect::StopPolling {
        task_id: task_id.clone(),
    }];
    let outcome = match classified {
        TaskStatus::Completed => {
            let output = output.unwrap_or(active.output);
            effects.push(Effect::Download {
                task_id: task_id.clone(),
                output,
            });
            TaskOutcome::Completed { task_id, output }
        }
        TaskStatus::Failed { .. } => {
            state.set_display(render_state(
                &status,
                progress,
                &terminal_message(&status, &message),
            ));
            TaskOutcome::Failed {
                task_id,
                status,
                detail: message,
            }
        }
        _ => {
            state.set_display(render_state(
                &status,
                progress,
                &terminal_message(&status, &message),
            ));
            TaskOutcome::Warning {
                task_id,
                status,
                detail: message,
            }
        }
    };

    state.session_mut().finish();
    state.set_outcome(Some(outcome));
    effects
}

/// Composite message rendered when a task ends without a download.
pub fn terminal_message(status: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("Task ended with status: {status}.")
    } else {
        format!("Task ended with status: {status}. Details: {detail}")
    }
}
