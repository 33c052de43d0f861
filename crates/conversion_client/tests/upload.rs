use std::fs;
use std::time::Duration;

use conversion_client::{ClientSettings, FailureKind, ReqwestUploader, UploadRequest, Uploader};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> ClientSettings {
    ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    }
}

fn request_in(dir: &TempDir) -> UploadRequest {
    let file = dir.path().join("book.pdf");
    fs::write(&file, b"%PDF-1.4 test").unwrap();
    UploadRequest {
        file,
        file_field: "pdf_file".to_string(),
        fields: vec![
            ("voice".to_string(), "en".to_string()),
            ("output_format".to_string(), "audio".to_string()),
        ],
    }
}

#[tokio::test]
async fn upload_returns_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("name=\"pdf_file\"; filename=\"book.pdf\""))
        .and(body_string_contains("name=\"voice\""))
        .respond_with(ResponseTemplate::new(202).set_body_string(r#"{"task_id":"abc"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let uploader = ReqwestUploader::new(&settings_for(&server)).unwrap();
    let reply = uploader.upload(&request_in(&dir)).await.expect("upload ok");

    assert_eq!(reply.task_id.as_deref(), Some("abc"));
    assert_eq!(reply.error, None);
}

#[tokio::test]
async fn upload_success_without_task_id_is_reported_as_such() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let uploader = ReqwestUploader::new(&settings_for(&server)).unwrap();
    let reply = uploader.upload(&request_in(&dir)).await.expect("upload ok");

    assert_eq!(reply.task_id, None);
}

#[tokio::test]
async fn rejected_upload_carries_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"bad file"}"#))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let uploader = ReqwestUploader::new(&settings_for(&server)).unwrap();
    let err = uploader.upload(&request_in(&dir)).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.server_error.as_deref(), Some("bad file"));
}

#[tokio::test]
async fn rejected_upload_with_html_body_has_no_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let uploader = ReqwestUploader::new(&settings_for(&server)).unwrap();
    let err = uploader.upload(&request_in(&dir)).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert_eq!(err.server_error, None);
}

#[tokio::test]
async fn missing_upload_file_is_an_io_failure() {
    let server = MockServer::start().await;
    let uploader = ReqwestUploader::new(&settings_for(&server)).unwrap();
    let request = UploadRequest {
        file: "/definitely/not/here.pdf".into(),
        file_field: "pdf_file".to_string(),
        fields: Vec::new(),
    };

    let err = uploader.upload(&request).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}

#[tokio::test]
async fn slow_upload_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(202)
                .set_delay(Duration::from_millis(300))
                .set_body_string(r#"{"task_id":"abc"}"#),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        upload_timeout: Duration::from_millis(50),
        ..settings_for(&server)
    };
    let dir = TempDir::new().unwrap();
    let uploader = ReqwestUploader::new(&settings).unwrap();
    let err = uploader.upload(&request_in(&dir)).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}
