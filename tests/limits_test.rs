//! Upload limits, authentication and rate limiting integration tests.

mod common;

use common::{fake_jpeg, file_form, read_status_line, stalled_upload, TestServer};
use ml_vision_server::Config;
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_upload_over_size_limit() {
    let mut config = Config::default();
    config.upload.max_upload_size = 1024;
    let server = TestServer::start_with(config).await;
    let client = server.client();

    let response = client
        .post(server.url("/analyze"))
        .multipart(file_form(fake_jpeg(1024), "ok.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .post(server.url("/analyze"))
        .multipart(file_form(fake_jpeg(2048), "big.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "payload_too_large");
}

#[tokio::test]
async fn test_body_far_over_limit_is_json() {
    let mut config = Config::default();
    config.upload.max_upload_size = 1024;
    let server = TestServer::start_with(config).await;

    // Larger than the file limit plus the multipart framing allowance
    let response = server
        .client()
        .post(server.url("/blur"))
        .multipart(file_form(fake_jpeg(200 * 1024), "huge.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 413);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "payload_too_large");
    assert_eq!(json["status"], 413);
}

#[tokio::test]
async fn test_slow_upload_times_out() {
    let mut config = Config::default();
    config.server.request_timeout = 1;
    let server = TestServer::start_with(config).await;

    let mut stream = stalled_upload(&server, "/analyze").await;
    let status_line = read_status_line(&mut stream).await;
    assert!(
        status_line.starts_with("HTTP/1.1 408"),
        "unexpected status line: {status_line}"
    );
}

#[tokio::test]
async fn test_concurrency_limit_queues_requests() {
    let mut config = Config::default();
    config.server.request_timeout = 2;
    config.server.max_concurrent_requests = 1;
    let server = TestServer::start_with(config).await;

    // Holds the only slot until its timeout fires
    let mut stream = stalled_upload(&server, "/analyze").await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    let err = impatient
        .get(server.url("/health"))
        .send()
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    let status_line = read_status_line(&mut stream).await;
    assert!(status_line.starts_with("HTTP/1.1 408"));

    let response = server.client().get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_allow_list_rejects_other_types() {
    let mut config = Config::default();
    config.upload.allowed_types = vec!["image/jpeg".to_string(), "image/png".to_string()];
    let server = TestServer::start_with(config).await;
    let client = server.client();

    let response = client
        .post(server.url("/blur"))
        .multipart(file_form(fake_jpeg(256), "car.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Plain text is outside the allow-list
    let response = client
        .post(server.url("/blur"))
        .multipart(file_form(b"hello".to_vec(), "fake.txt", "text/plain"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 415);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "unsupported_media_type");
}

#[tokio::test]
async fn test_auth_required_for_uploads() {
    let server = TestServer::start_with_auth(vec!["test-key-123".to_string()]).await;
    let client = server.client();

    let response = client
        .post(server.url("/analyze"))
        .multipart(file_form(fake_jpeg(128), "a.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "unauthorized");

    let response = client
        .post(server.url("/blur"))
        .header("Authorization", "Bearer wrong-key")
        .multipart(file_form(fake_jpeg(128), "a.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = client
        .post(server.url("/analyze"))
        .header("Authorization", "Bearer test-key-123")
        .multipart(file_form(fake_jpeg(128), "a.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = client
        .post(server.url("/blur"))
        .header("X-API-Key", "test-key-123")
        .multipart(file_form(fake_jpeg(128), "a.jpg", "image/jpeg"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let server = TestServer::start_with_rate_limit(2).await;
    let client = server.client();

    for _ in 0..2 {
        let response = client.get(server.url("/health")).send().await.unwrap();
        assert_eq!(response.status(), 200);
    }

    let response = client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 429);
    assert!(response.headers().contains_key("retry-after"));
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "rate_limit_exceeded");

    // Other clients behind a proxy keep their own quota
    let response = client
        .get(server.url("/health"))
        .header("X-Forwarded-For", "203.0.113.9")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
