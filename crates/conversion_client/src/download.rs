use std::path::PathBuf;
use std::time::Duration;

use bytes::BytesMut;
use conversion_logging::{conv_info, conv_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};

use crate::types::{json_text_field, map_reqwest_error, server_error_field};
use crate::{
    AtomicFileWriter, ClientError, ClientSettings, DownloadOutput, DownloadRequest, FailureKind,
    Routes,
};

/// Retrieves a finished artifact. This is the client-side equivalent of
/// navigating the page to the download URL.
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutput, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestDownloader {
    client: reqwest::Client,
    routes: Routes,
    output_dir: PathBuf,
    max_bytes: u64,
    timeout: Duration,
}

impl ReqwestDownloader {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        Ok(Self {
            client: settings.build_client()?,
            routes: Routes::new(&settings.base_url)?,
            output_dir: settings.output_dir.clone(),
            max_bytes: settings.max_download_bytes,
            timeout: settings.download_timeout,
        })
    }

    fn too_large(&self, actual: u64) -> ClientError {
        ClientError::new(
            FailureKind::TooLarge {
                max_bytes: self.max_bytes,
                actual: Some(actual),
            },
            "download too large",
        )
    }
}

#[async_trait::async_trait]
impl Downloader for ReqwestDownloader {
    async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutput, ClientError> {
        let url = self.routes.download(&request.task_id, &request.file_type);
        conv_info!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(
                ClientError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
                    .with_server_error(server_error_field(&body)),
            );
        }
        // Any other 2xx (e.g. 202 with a status body) means the artifact is not ready.
        if status != StatusCode::OK {
            let body = response.bytes().await.unwrap_or_default();
            let reported = json_text_field(&body, "status").or_else(|| server_error_field(&body));
            conv_warn!(
                "Download for task {} answered {} ({:?})",
                request.task_id,
                status,
                reported
            );
            return Err(ClientError::new(
                FailureKind::InvalidResponse,
                format!("artifact not available: {status}"),
            )
            .with_server_error(reported));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(self.too_large(content_len));
            }
        }

        let file_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename)
            .unwrap_or_else(|| request.fallback_name.clone());

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(self.too_large(next_len));
            }
            body.extend_from_slice(&chunk);
        }

        let writer = AtomicFileWriter::new(self.output_dir.clone());
        let fallback_name = request.fallback_name.clone();
        let body = body.freeze();
        tokio::task::spawn_blocking(move || {
            save_artifact(&writer, &file_name, &fallback_name, &body)
        })
        .await
        .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?
    }
}

/// Hashes and stores the body. Runs on the blocking pool.
fn save_artifact(
    writer: &AtomicFileWriter,
    file_name: &str,
    fallback_name: &str,
    body: &[u8],
) -> Result<DownloadOutput, ClientError> {
    let sha256 = hex_digest(body);
    let path = match writer.write(file_name, body) {
        Ok(path) => path,
        Err(err) if file_name != fallback_name => {
            conv_warn!(
                "Cannot save as {:?} ({}), using {:?}",
                file_name,
                err,
                fallback_name
            );
            writer
                .write(fallback_name, body)
                .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?
        }
        Err(err) => return Err(ClientError::new(FailureKind::Io, err.to_string())),
    };

    conv_info!("Saved {} bytes to {:?}", body.len(), path);
    Ok(DownloadOutput {
        path,
        byte_len: body.len() as u64,
        sha256,
    })
}

/// Extracts the file name from a `Content-Disposition` header value.
///
/// Handles `filename="a b.mp3"` and bare `filename=a.mp3`. Directory parts
/// are stripped so the result is always a plain file name.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"'))
    })?;
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_filename() {
        assert_eq!(
            content_disposition_filename("attachment; filename=\"book audio.mp3\"").as_deref(),
            Some("book audio.mp3")
        );
    }

    #[test]
    fn parses_bare_filename_and_strips_directories() {
        assert_eq!(
            content_disposition_filename("attachment; filename=../../etc/passwd").as_deref(),
            Some("passwd")
        );
        assert_eq!(
            content_disposition_filename("attachment; FILENAME=out.pdf").as_deref(),
            Some("out.pdf")
        );
    }

    #[test]
    fn missing_filename_is_none() {
        assert_eq!(content_disposition_filename("inline"), None);
        assert_eq!(content_disposition_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn digest_is_lowercase_hex() {
        assert_eq!(
            hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
