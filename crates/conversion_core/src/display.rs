use crate::TaskStatus;

/// Colour family of the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Success,
    Danger,
}

/// What the progress indicator shows after one render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayState {
    pub label: String,
    pub progress: u8,
    /// Message the state was rendered with; kept for terminal summaries.
    pub message: String,
    /// Striped/animated bar while work is still under way.
    pub animated: bool,
    pub tone: Tone,
}

impl DisplayState {
    /// Text shown next to the bar, e.g. `"Processing chunk 3/10 (30%)"`.
    pub fn text(&self) -> String {
        format!("{} ({}%)", self.label, self.progress)
    }

    /// Indicator state while the upload request is in flight.
    pub fn uploading() -> Self {
        render_state("Uploading", 0, "")
    }

    /// Local error state (submission or poll failure). The label is the
    /// message itself.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            label: message.clone(),
            progress: 0,
            message,
            animated: false,
            tone: Tone::Danger,
        }
    }
}

/// Maps a raw status to what the indicator shows. Purely presentational;
/// whether polling continues is decided by [`TaskStatus::is_terminal`].
pub fn render_state(status: &str, progress: u8, message: &str) -> DisplayState {
    let classified = TaskStatus::classify(status, message);
    let failed = classified.is_failed();
    let animated = progress < 100 && !failed;
    let tone = if failed {
        Tone::Danger
    } else if classified == TaskStatus::Completed && !animated {
        Tone::Success
    } else {
        Tone::Neutral
    };

    DisplayState {
        label: classified.label(),
        progress,
        message: message.to_string(),
        animated,
        tone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_statuses_are_animated() {
        let state = render_state("Processing chunk 3/10", 30, "");
        assert!(state.animated);
        assert_eq!(state.tone, Tone::Neutral);
        assert_eq!(state.text(), "Processing chunk 3/10 (30%)");
    }

    #[test]
    fn completed_at_full_progress_is_success() {
        let state = render_state("Completed", 100, "");
        assert!(!state.animated);
        assert_eq!(state.tone, Tone::Success);
        assert_eq!(state.text(), "Processing Complete! (100%)");
    }

    #[test]
    fn completed_below_full_progress_stays_animated() {
        let state = render_state("Completed", 90, "");
        assert!(state.animated);
        assert_eq!(state.tone, Tone::Neutral);
    }

    #[test]
    fn failed_is_danger_and_static() {
        let state = render_state("Failed", 40, "ocr crashed");
        assert!(!state.animated);
        assert_eq!(state.tone, Tone::Danger);
        assert_eq!(state.label, "Error: ocr crashed");
    }

    #[test]
    fn local_error_uses_message_as_label() {
        let state = DisplayState::error("Could not retrieve progress.");
        assert_eq!(state.text(), "Could not retrieve progress. (0%)");
        assert_eq!(state.tone, Tone::Danger);
        assert!(!state.animated);
    }

    #[test]
    fn uploading_starts_at_zero() {
        let state = DisplayState::uploading();
        assert_eq!(state.text(), "Uploading (0%)");
        assert!(state.animated);
    }
}
