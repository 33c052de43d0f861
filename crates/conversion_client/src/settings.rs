use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::{ClientError, FailureKind};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Timeout for status checks.
    pub request_timeout: Duration,
    /// Timeout for the upload request, which carries the whole document.
    pub upload_timeout: Duration,
    /// Timeout for retrieving a finished artifact, body included.
    pub download_timeout: Duration,
    pub poll_interval: Duration,
    pub max_download_bytes: u64,
    pub output_dir: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            upload_timeout: Duration::from_secs(300),
            download_timeout: Duration::from_secs(1800),
            poll_interval: Duration::from_millis(3000),
            max_download_bytes: 512 * 1024 * 1024,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ClientSettings {
    pub(crate) fn build_client(&self) -> Result<reqwest::Client, ClientError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))
    }
}

/// The three backend endpoints, resolved against the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    base: Url,
}

impl Routes {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::new(
                FailureKind::InvalidUrl,
                format!("not an http(s) base url: {base_url}"),
            ));
        }
        Ok(Self { base })
    }

    /// `POST /`
    pub fn upload(&self) -> Url {
        self.base.clone()
    }

    /// `GET /progress/{task_id}`
    pub fn progress(&self, task_id: &str) -> Url {
        self.with_segments(&["progress", task_id])
    }

    /// `GET /download/{task_id}/{file_type}`
    pub fn download(&self, task_id: &str, file_type: &str) -> Url {
        self.with_segments(&["download", task_id, file_type])
    }

    fn with_segments(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
