use std::fs;
use std::time::Duration;

use conversion_client::{
    ClientSettings, DownloadRequest, Downloader, FailureKind, ReqwestDownloader,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader_for(server: &MockServer, dir: &TempDir, max_bytes: u64) -> ReqwestDownloader {
    ReqwestDownloader::new(&ClientSettings {
        base_url: server.uri(),
        output_dir: dir.path().join("out"),
        max_download_bytes: max_bytes,
        ..ClientSettings::default()
    })
    .unwrap()
}

fn request(task_id: &str) -> DownloadRequest {
    DownloadRequest {
        task_id: task_id.to_string(),
        file_type: "audio".to_string(),
        fallback_name: format!("{task_id}.mp3"),
    }
}

#[tokio::test]
async fn download_uses_content_disposition_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/abc/audio"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=\"book.mp3\"")
                .set_body_bytes(b"ID3audio".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = downloader_for(&server, &dir, 1024)
        .download(&request("abc"))
        .await
        .expect("download ok");

    assert_eq!(output.path, dir.path().join("out").join("book.mp3"));
    assert_eq!(output.byte_len, 8);
    assert_eq!(fs::read(&output.path).unwrap(), b"ID3audio");
    assert_eq!(output.sha256.len(), 64);
}

#[tokio::test]
async fn download_falls_back_to_task_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/abc/audio"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = downloader_for(&server, &dir, 1024)
        .download(&request("abc"))
        .await
        .expect("download ok");

    assert_eq!(output.path.file_name().unwrap(), "abc.mp3");
}

#[tokio::test]
async fn download_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/abc/audio"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"error":"Requested format not available"}"#),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader_for(&server, &dir, 1024)
        .download(&request("abc"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(
        err.server_error.as_deref(),
        Some("Requested format not available")
    );
    assert!(!dir.path().join("out").join("abc.mp3").exists());
}

#[tokio::test]
async fn download_rejects_oversized_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/abc/audio"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader_for(&server, &dir, 10)
        .download(&request("abc"))
        .await
        .unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(64),
        }
    );
}

#[tokio::test]
async fn accepted_status_body_is_not_an_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/abc/audio"))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("Content-Type", "application/json")
                .set_body_string(r#"{"status":"completed"}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader_for(&server, &dir, 1024)
        .download(&request("abc"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidResponse);
    assert_eq!(err.server_error.as_deref(), Some("completed"));
    assert!(!dir.path().join("out").join("abc.mp3").exists());
}

#[tokio::test]
async fn slow_artifact_uses_download_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/abc/audio"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_bytes(b"ID3slow".to_vec()),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let settings = ClientSettings {
        base_url: server.uri(),
        output_dir: dir.path().join("out"),
        request_timeout: Duration::from_millis(100),
        download_timeout: Duration::from_secs(10),
        ..ClientSettings::default()
    };
    let output = ReqwestDownloader::new(&settings)
        .unwrap()
        .download(&request("abc"))
        .await
        .expect("download outlives the status-check timeout");
    assert_eq!(fs::read(&output.path).unwrap(), b"ID3slow");

    let strict = ClientSettings {
        download_timeout: Duration::from_millis(100),
        ..settings
    };
    let err = ReqwestDownloader::new(&strict)
        .unwrap()
        .download(&request("abc"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
