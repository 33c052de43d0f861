use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use conversion_client::{ClientSettings, Routes};
use conversion_core::{OutputKind, UploadForm, DEFAULT_FILE_FIELD};
use conversion_logging::conv_info;
use serde::{Deserialize, Serialize};

use super::{Cli, ConfigError};

pub const DEFAULT_CONFIG_FILE: &str = "convert.ron";

const DEFAULT_VOICE: &str = "en";
const DEFAULT_SPEED: f32 = 1.0;

/// Optional RON profile. Every key may be omitted; command-line flags win.
///
/// ```ron
/// (
///     base_url: Some("https://convert.example.com/"),
///     output_format: Some("pdf"),
///     fields: { "lang": "de" },
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub output_format: Option<String>,
    pub voice: Option<String>,
    pub speed: Option<f32>,
    pub file_field: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub upload_timeout_secs: Option<u64>,
    pub download_timeout_secs: Option<u64>,
    pub fields: BTreeMap<String, String>,
}

/// Loads the RON profile.
///
/// An explicit `path` must exist. Without one, `convert.ron` in the working
/// directory is used when present and defaults apply otherwise.
pub fn load_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path,
                message: err.to_string(),
            });
        }
    };

    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.clone(),
        message: err.to_string(),
    })?;
    conv_info!("Loaded config from {:?}", path);
    Ok(config)
}

/// Everything one run needs: engine settings and the form to submit.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub settings: ClientSettings,
    pub form: UploadForm,
}

impl RunConfig {
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let mut settings = ClientSettings::default();
        if let Some(base_url) = cli.base_url.clone().or(file.base_url) {
            settings.base_url = base_url;
        }
        Routes::new(&settings.base_url).map_err(|err| ConfigError::BaseUrl {
            url: settings.base_url.clone(),
            message: err.message,
        })?;
        if let Some(dir) = cli.output_dir.clone().or(file.output_dir) {
            settings.output_dir = dir;
        }
        if let Some(ms) = cli.poll_interval_ms.or(file.poll_interval_ms) {
            if ms == 0 {
                return Err(ConfigError::PollInterval);
            }
            settings.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = file.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.upload_timeout_secs {
            settings.upload_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.download_timeout_secs {
            settings.download_timeout = Duration::from_secs(secs);
        }

        let output = match (cli.format, file.output_format) {
            (Some(arg), _) => OutputKind::from(arg),
            (None, Some(raw)) => {
                OutputKind::parse(&raw).ok_or(ConfigError::OutputFormat(raw))?
            }
            (None, None) => OutputKind::default(),
        };
        let speed = cli.speed.or(file.speed).unwrap_or(DEFAULT_SPEED);
        if !(speed.is_finite() && speed > 0.0) {
            return Err(ConfigError::Speed(speed));
        }
        let voice = cli
            .voice
            .clone()
            .or(file.voice)
            .unwrap_or_else(|| DEFAULT_VOICE.to_string());
        let file_field = cli
            .file_field
            .clone()
            .or(file.file_field)
            .unwrap_or_else(|| DEFAULT_FILE_FIELD.to_string());

        let mut form = UploadForm::new(&cli.file)
            .with_file_field(file_field)
            .with_field("voice", voice)
            .with_field("output_format", output.as_str())
            .with_field("speed", speed.to_string());
        for (name, value) in file.fields {
            form = form.with_field(name, value);
        }
        for raw in &cli.fields {
            let (name, value) = parse_field(raw)?;
            form = form.with_field(name, value);
        }

        Ok(Self { settings, form })
    }
}

fn parse_field(raw: &str) -> Result<(&str, &str), ConfigError> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(ConfigError::Field(raw.to_string())),
    }
}
