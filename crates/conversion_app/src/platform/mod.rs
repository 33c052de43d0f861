mod cli;
mod config;
mod effects;
mod error;
mod render;
mod session;

pub use cli::{Cli, FormatArg};
pub use config::{load_config, FileConfig, RunConfig, DEFAULT_CONFIG_FILE};
pub use effects::{download_request, map_progress, map_upload_result, upload_request, EffectRunner};
pub use error::{AppError, ConfigError};
pub use render::{LogObserver, TerminalObserver};
pub use session::{run_session, SessionReport};
