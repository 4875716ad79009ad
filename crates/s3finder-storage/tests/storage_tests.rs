//! Storage facade tests against a mock S3 endpoint.

use std::time::Duration;

use chrono::Utc;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use s3finder_storage::{
    FileFinder, ObjectKey, SearchOutcome, StorageClient, StorageConfig, StorageError,
    DEFAULT_BUCKET,
};

const DISPOSITION_CAT: &str =
    "response-content-disposition=attachment%3B%20filename%3D%22cat.png%22";

fn config_for(server: &MockServer) -> StorageConfig {
    StorageConfig {
        access_key_id: Some("AKIDEXAMPLE".to_string()),
        secret_access_key: Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string()),
        region: Some("us-east-1".to_string()),
        endpoint_url: Some(server.uri()),
        force_path_style: true,
        ..StorageConfig::default()
    }
}

fn object_path(key: &str) -> String {
    format!("/{}/{}", DEFAULT_BUCKET, key)
}

async fn mount_head(server: &MockServer, key: &str, status: u16) {
    Mock::given(method("HEAD"))
        .and(path(object_path(key)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn client_for(server: &MockServer) -> StorageClient {
    StorageClient::authenticate(&config_for(server))
        .await
        .expect("static credentials authenticate")
}

#[tokio::test]
async fn test_exists_true_for_present_object() {
    let server = MockServer::start().await;
    mount_head(&server, "cat.png", 200).await;

    let client = client_for(&server).await;
    let key = ObjectKey::parse("cat.png").unwrap();
    assert!(client.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_exists_false_for_missing_object() {
    let server = MockServer::start().await;
    mount_head(&server, "missing.png", 404).await;

    let client = client_for(&server).await;
    let key = ObjectKey::parse("missing.png").unwrap();
    assert!(!client.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_exists_errors_on_permission_denied() {
    let server = MockServer::start().await;
    mount_head(&server, "secret.png", 403).await;

    let client = client_for(&server).await;
    let key = ObjectKey::parse("secret.png").unwrap();
    let err = client.exists(&key).await.unwrap_err();
    assert!(matches!(err, StorageError::AwsSdk(_)));
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_exists_probes_nested_key_verbatim() {
    let server = MockServer::start().await;
    mount_head(&server, "photos/2024/cat.png", 200).await;

    let client = client_for(&server).await;
    let key = ObjectKey::parse("photos/2024/cat.png").unwrap();
    assert!(client.exists(&key).await.unwrap());
}

#[tokio::test]
async fn test_presign_forces_download_with_key_name() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;
    let key = ObjectKey::parse("cat.png").unwrap();

    let before = Utc::now();
    let presigned = client
        .presign_download(&key, Duration::from_secs(3600))
        .await
        .unwrap();

    assert!(presigned.url.starts_with(&server.uri()));
    assert!(presigned.url.contains(&object_path("cat.png")));
    assert!(presigned.url.contains(DISPOSITION_CAT));
    assert!(presigned.url.contains("X-Amz-Expires=3600"));
    assert!(presigned.url.contains("X-Amz-Signature="));
    assert_eq!(presigned.expires_in_secs, 3600);
    assert!(presigned.expires_at >= before + chrono::Duration::seconds(3600));
    assert!(presigned.expires_at <= Utc::now() + chrono::Duration::seconds(3600));
}

#[tokio::test]
async fn test_presign_nested_key_keeps_path() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;
    let key = ObjectKey::parse("photos/2024/cat.png").unwrap();

    let presigned = client
        .presign_download(&key, Duration::from_secs(60))
        .await
        .unwrap();

    let expected_prefix = format!("{}{}?", server.uri(), object_path("photos/2024/cat.png"));
    assert!(presigned.url.starts_with(&expected_prefix));
    assert!(presigned
        .url
        .contains("filename%3D%22photos%2F2024%2Fcat.png%22"));
}

#[tokio::test]
async fn test_search_rejects_dot_segment_keys_without_backend_call() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let finder = FileFinder::new(config_for(&server));
    for name in ["../secret.txt", "photos/../cat.png", "./cat.png"] {
        let outcome = finder.search(name).await;
        assert!(matches!(outcome, SearchOutcome::InvalidKey(_)), "{name}");
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_presign_rejects_expiry_beyond_seven_days() {
    let server = MockServer::start().await;
    let client = client_for(&server).await;
    let key = ObjectKey::parse("cat.png").unwrap();

    let err = client
        .presign_download(&key, Duration::from_secs(8 * 24 * 3600))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::PresignFailed(_)));
}

#[tokio::test]
async fn test_partial_credentials_fail_authentication() {
    let server = MockServer::start().await;
    let config = StorageConfig {
        secret_access_key: None,
        ..config_for(&server)
    };

    let err = StorageClient::authenticate(&config).await.err().unwrap();
    assert!(matches!(err, StorageError::PartialCredentials(_)));
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_search_found_returns_presigned_url() {
    let server = MockServer::start().await;
    mount_head(&server, "cat.png", 200).await;

    let finder = FileFinder::new(config_for(&server));
    let outcome = finder.search("cat.png").await;

    let url = outcome.into_url().expect("object exists");
    assert!(url.url.contains(DISPOSITION_CAT));
}

#[tokio::test]
async fn test_search_missing_returns_not_found() {
    let server = MockServer::start().await;
    mount_head(&server, "missing.png", 404).await;

    let finder = FileFinder::new(config_for(&server));
    assert!(matches!(finder.search("missing.png").await, SearchOutcome::NotFound));
    assert!(finder.search_and_download_file("missing.png").await.is_none());
}

#[tokio::test]
async fn test_search_backend_error_is_absorbed() {
    let server = MockServer::start().await;
    mount_head(&server, "secret.png", 403).await;

    let finder = FileFinder::new(config_for(&server));
    let outcome = finder.search("secret.png").await;
    assert!(matches!(outcome, SearchOutcome::BackendError(_)));
    assert!(outcome.into_url().is_none());
}

#[tokio::test]
async fn test_search_server_error_is_absorbed() {
    let server = MockServer::start().await;
    mount_head(&server, "cat.png", 503).await;

    let finder = FileFinder::new(config_for(&server));
    assert!(finder.search_and_download_file("cat.png").await.is_none());
    // Retries are disabled: exactly one probe reached the backend.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_partial_credentials_is_auth_failure() {
    let server = MockServer::start().await;
    mount_head(&server, "cat.png", 200).await;

    let config = StorageConfig {
        access_key_id: None,
        ..config_for(&server)
    };
    let finder = FileFinder::new(config);

    let outcome = finder.search("cat.png").await;
    assert!(matches!(outcome, SearchOutcome::AuthFailure(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_is_idempotent() {
    let server = MockServer::start().await;
    mount_head(&server, "cat.png", 200).await;
    mount_head(&server, "missing.png", 404).await;

    let finder = FileFinder::new(config_for(&server));

    let first = finder.search("cat.png").await;
    let second = finder.search("cat.png").await;
    assert!(first.is_found() && second.is_found());

    let first = finder.search("missing.png").await;
    let second = finder.search("missing.png").await;
    assert_eq!(first.label(), second.label());
}

#[tokio::test]
async fn test_search_rejects_unaddressable_keys_without_backend_call() {
    let server = MockServer::start().await;
    let finder = FileFinder::new(config_for(&server));

    assert!(matches!(finder.search("").await, SearchOutcome::InvalidKey(_)));
    let long_name = "x".repeat(2048);
    assert!(matches!(finder.search(&long_name).await, SearchOutcome::InvalidKey(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_download_file_writes_object() {
    let server = MockServer::start().await;
    mount_head(&server, "notes.txt", 200).await;
    Mock::given(method("GET"))
        .and(path(object_path("notes.txt")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello world".to_vec()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("notes.txt");

    let client = client_for(&server).await;
    let key = ObjectKey::parse("notes.txt").unwrap();
    let written = client.download_file(&key, &target).await.unwrap();

    assert_eq!(written, 11);
    assert_eq!(tokio::fs::read(&target).await.unwrap(), b"hello world");
}

#[tokio::test]
async fn test_download_file_missing_object() {
    let server = MockServer::start().await;
    mount_head(&server, "missing.txt", 404).await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing.txt");

    let client = client_for(&server).await;
    let key = ObjectKey::parse("missing.txt").unwrap();
    let err = client.download_file(&key, &target).await.unwrap_err();

    assert!(matches!(err, StorageError::NotFound(_)));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_check_connectivity() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path_regex(format!("^/{}/?$", DEFAULT_BUCKET)))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.check_connectivity().await.is_ok());
}
