use conversion_logging::conv_trace;

use crate::types::map_reqwest_error;
use crate::{ClientError, ClientSettings, FailureKind, ProgressReport, Routes};

#[async_trait::async_trait]
pub trait ProgressFetcher: Send + Sync {
    /// One status check for `task_id`.
    async fn fetch(&self, task_id: &str) -> Result<ProgressReport, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestProgressFetcher {
    client: reqwest::Client,
    routes: Routes,
}

impl ReqwestProgressFetcher {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        Ok(Self {
            client: settings.build_client()?,
            routes: Routes::new(&settings.base_url)?,
        })
    }
}

#[async_trait::async_trait]
impl ProgressFetcher for ReqwestProgressFetcher {
    async fn fetch(&self, task_id: &str) -> Result<ProgressReport, ClientError> {
        let url = self.routes.progress(task_id);
        conv_trace!("Checking progress at {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let json: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(ProgressReport::from_json(&json))
    }
}
