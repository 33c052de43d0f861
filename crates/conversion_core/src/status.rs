//! Classification of the backend's free-form status strings.
//!
//! The backend reports statuses in mixed spellings (`"completed"`,
//! `"Completed"`, `"Warning: 2 chunks skipped"`, `"Processing chunk 3/10"`).
//! [`TaskStatus::classify`] is the single place where those strings are
//! interpreted; everything else matches on the resulting variant. Keywords are
//! compared ignoring ASCII case.

const CHUNK_PREFIX: &str = "processing chunk";
const WARNING_PREFIX: &str = "warning";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Initializing,
    /// Generic processing; `detail` is the accompanying message.
    Processing { detail: String },
    /// `"Processing chunk N/M"`. `label` keeps the original text for display.
    ChunkProgress {
        label: String,
        current: Option<u32>,
        total: Option<u32>,
    },
    Concatenating,
    Completed,
    /// Terminal failure; `reason` is the accompanying message.
    Failed { reason: String },
    /// Terminal warning; `status` is the full original status string.
    Warning { status: String },
    /// Anything unrecognised, shown verbatim.
    Other(String),
}

impl TaskStatus {
    pub fn classify(status: &str, message: &str) -> Self {
        if status.eq_ignore_ascii_case("initializing") {
            Self::Initializing
        } else if status.eq_ignore_ascii_case("processing") {
            Self::Processing {
                detail: message.to_string(),
            }
        } else if starts_with_ignore_case(status, CHUNK_PREFIX) {
            let (current, total) = parse_chunk_counts(&status[CHUNK_PREFIX.len()..]);
            Self::ChunkProgress {
                label: status.to_string(),
                current,
                total,
            }
        } else if status.eq_ignore_ascii_case("concatenating audio files...") {
            Self::Concatenating
        } else if status.eq_ignore_ascii_case("completed") {
            Self::Completed
        } else if status.eq_ignore_ascii_case("failed") {
            Self::Failed {
                reason: message.to_string(),
            }
        } else if starts_with_ignore_case(status, WARNING_PREFIX) {
            Self::Warning {
                status: status.to_string(),
            }
        } else {
            Self::Other(status.to_string())
        }
    }

    /// Whether this status ends the poll loop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed { .. } | Self::Warning { .. }
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// User-facing label for the progress indicator.
    pub fn label(&self) -> String {
        match self {
            Self::Initializing => "Initializing Task...".to_string(),
            Self::Processing { detail } if detail.is_empty() => "Processing...".to_string(),
            Self::Processing { detail } => detail.clone(),
            Self::ChunkProgress { label, .. } => label.clone(),
            Self::Concatenating => "Concatenating Audio...".to_string(),
            Self::Completed => "Processing Complete!".to_string(),
            Self::Failed { reason } if reason.is_empty() => "Error: Unknown error".to_string(),
            Self::Failed { reason } => format!("Error: {reason}"),
            Self::Warning { status } => status.clone(),
            Self::Other(status) => status.clone(),
        }
    }
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

// Accepts "3/10", " 3 of 10", "3/10..." and similar.
fn parse_chunk_counts(rest: &str) -> (Option<u32>, Option<u32>) {
    let mut numbers = rest
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u32>().ok());
    let current = numbers.next().flatten();
    let total = numbers.next().flatten();
    (current, total)
}
