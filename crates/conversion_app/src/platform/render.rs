use std::time::Duration;

use conversion_core::{AppViewModel, DisplayState, ProgressObserver, Tone};
use conversion_logging::{conv_error, conv_info};
use indicatif::{ProgressBar, ProgressStyle};

const NEUTRAL_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}";
const SUCCESS_TEMPLATE: &str = "  [{bar:40.green}] {pos:>3}% {msg}";
const DANGER_TEMPLATE: &str = "  [{bar:40.red}] {pos:>3}% {msg}";

/// Progress bar on the terminal. Style follows the display tone; the
/// spinner runs while the indicator is animated.
pub struct TerminalObserver {
    bar: ProgressBar,
    shown: Option<(Tone, bool)>,
    last_message: String,
}

impl TerminalObserver {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::new(100),
            shown: None,
            last_message: String::new(),
        }
    }

    /// Leaves the last state on screen.
    pub fn finish(&self) {
        self.bar.disable_steady_tick();
        self.bar.abandon();
    }

    fn apply_style(&mut self, display: &DisplayState) {
        let key = (display.tone, display.animated);
        if self.shown == Some(key) {
            return;
        }
        let template = match display.tone {
            Tone::Neutral => NEUTRAL_TEMPLATE,
            Tone::Success => SUCCESS_TEMPLATE,
            Tone::Danger => DANGER_TEMPLATE,
        };
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        self.bar.set_style(style);
        if display.animated {
            self.bar.enable_steady_tick(Duration::from_millis(120));
        } else {
            self.bar.disable_steady_tick();
        }
        self.shown = Some(key);
    }
}

impl Default for TerminalObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TerminalObserver {
    fn render(&mut self, view: &AppViewModel) {
        let display = &view.display;
        self.apply_style(display);
        self.bar.set_position(u64::from(display.progress));
        self.bar.set_message(display.label.clone());

        // Terminal summaries carry more than the label shows.
        if view.outcome.is_some()
            && !display.message.is_empty()
            && display.message != display.label
            && display.message != self.last_message
        {
            self.bar.println(&display.message);
            self.last_message = display.message.clone();
        }
    }
}

/// Plain log lines, one per visible change. Used when no terminal bar is
/// wanted.
#[derive(Debug, Default)]
pub struct LogObserver {
    last_text: String,
}

impl ProgressObserver for LogObserver {
    fn render(&mut self, view: &AppViewModel) {
        let text = view.display.text();
        if text == self.last_text {
            return;
        }
        if view.display.tone == Tone::Danger {
            conv_error!("{}", text);
        } else {
            conv_info!("{} [{}]", text, view.control.label);
        }
        self.last_text = text;
    }
}
