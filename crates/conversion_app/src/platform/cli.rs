use std::path::PathBuf;

use clap::Parser;
use conversion_core::OutputKind;

/// Upload a document for conversion, follow its progress and download the
/// result.
#[derive(Parser, Debug, Clone)]
#[command(name = "convert", version, about)]
pub struct Cli {
    /// Document to upload.
    pub file: PathBuf,

    /// Base URL of the conversion service.
    #[arg(long, env = "CONVERT_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory the converted file is saved to.
    #[arg(short, long, env = "CONVERT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Requested output kind.
    #[arg(long, env = "CONVERT_FORMAT", value_enum)]
    pub format: Option<FormatArg>,

    /// Voice used for audio output.
    #[arg(long, env = "CONVERT_VOICE")]
    pub voice: Option<String>,

    /// Speech speed multiplier for audio output.
    #[arg(long, env = "CONVERT_SPEED")]
    pub speed: Option<f32>,

    /// Multipart field name of the uploaded file.
    #[arg(long)]
    pub file_field: Option<String>,

    /// Extra form field, as KEY=VALUE. May be repeated.
    #[arg(short = 'F', long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Milliseconds between status checks.
    #[arg(long, env = "CONVERT_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// RON profile with defaults. `convert.ron` in the working directory is
    /// used when present.
    #[arg(long, env = "CONVERT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print plain log lines instead of a progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Log file used while the progress bar is shown.
    #[arg(long, env = "CONVERT_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// No logging at all.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Audio,
    Pdf,
}

impl From<FormatArg> for OutputKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Audio => OutputKind::Audio,
            FormatArg::Pdf => OutputKind::Pdf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_fields_and_format() {
        let cli = Cli::try_parse_from([
            "convert",
            "book.pdf",
            "--format",
            "pdf",
            "-F",
            "lang=de",
            "--field",
            "pages=1-3",
        ])
        .unwrap();
        assert_eq!(cli.file, PathBuf::from("book.pdf"));
        assert_eq!(cli.format, Some(FormatArg::Pdf));
        assert_eq!(cli.fields, vec!["lang=de", "pages=1-3"]);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["convert", "a.pdf", "-v", "-q"]).is_err());
    }
}
