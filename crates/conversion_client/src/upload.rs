use conversion_logging::{conv_debug, conv_info};
use reqwest::multipart::{Form, Part};

use crate::types::{map_reqwest_error, server_error_field};
use crate::{ClientError, ClientSettings, FailureKind, Routes, UploadReply, UploadRequest};

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    /// Issues one upload. Never retried.
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReply, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    client: reqwest::Client,
    routes: Routes,
    timeout: std::time::Duration,
}

impl ReqwestUploader {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        Ok(Self {
            client: settings.build_client()?,
            routes: Routes::new(&settings.base_url)?,
            timeout: settings.upload_timeout,
        })
    }

    async fn build_form(request: &UploadRequest) -> Result<Form, ClientError> {
        let bytes = tokio::fs::read(&request.file).await.map_err(|err| {
            ClientError::new(
                FailureKind::Io,
                format!("cannot read {}: {err}", request.file.display()),
            )
        })?;
        let file_name = request
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let mut form = Form::new().part(
            request.file_field.clone(),
            Part::bytes(bytes).file_name(file_name),
        );
        for (name, value) in &request.fields {
            form = form.text(name.clone(), value.clone());
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(&self, request: &UploadRequest) -> Result<UploadReply, ClientError> {
        let form = Self::build_form(request).await?;
        let url = self.routes.upload();
        conv_info!("Uploading {} to {}", request.file.display(), url);

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        conv_debug!("Upload answered {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(
                ClientError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
                    .with_server_error(server_error_field(&body)),
            );
        }

        let json: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|err| ClientError::new(FailureKind::InvalidResponse, err.to_string()))?;
        Ok(UploadReply::from_json(&json))
    }
}
