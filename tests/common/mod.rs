//! Common test utilities and helpers.
#![allow(dead_code)]

use ml_vision_server::{
    config::{AuthConfig, Config, RateLimitConfig},
    create_router, AppState,
};
use reqwest::multipart;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Test server instance
pub struct TestServer {
    pub base_url: String,
    pub addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a test server with the default configuration
    pub async fn start() -> Self {
        Self::start_with(Config::default()).await
    }

    /// Start a test server with authentication enabled
    pub async fn start_with_auth(api_keys: Vec<String>) -> Self {
        let mut config = Config::default();
        config.auth = AuthConfig {
            enabled: true,
            api_keys,
            ..AuthConfig::default()
        };
        Self::start_with(config).await
    }

    /// Start a test server allowing `requests` per minute per client
    pub async fn start_with_rate_limit(requests: u32) -> Self {
        let mut config = Config::default();
        config.rate_limit = RateLimitConfig {
            enabled: true,
            requests_per_window: requests,
            window_seconds: 60,
        };
        Self::start_with(config).await
    }

    /// Start a test server on a random port with the given configuration
    pub async fn start_with(mut config: Config) -> Self {
        config.server.host = "127.0.0.1".to_string();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local address");

        let app = create_router(AppState::new(config));
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await;
        });

        Self {
            base_url: format!("http://{}", addr),
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get HTTP client
    pub fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap()
    }

    /// Get URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Multipart form with a single `file` part
pub fn file_form(data: Vec<u8>, filename: &str, mime: &str) -> multipart::Form {
    multipart::Form::new().part(
        "file",
        multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(mime)
            .unwrap(),
    )
}

/// Open a raw connection and send a multipart upload to `path` whose body
/// stops short of its declared length, leaving the request in flight
pub async fn stalled_upload(server: &TestServer, path: &str) -> TcpStream {
    let partial = "--B\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.jpg\"\r\n\r\npartial";
    let head = format!(
        "POST {path} HTTP/1.1\r\nHost: {}\r\nContent-Type: multipart/form-data; boundary=B\r\nContent-Length: 4096\r\n\r\n",
        server.addr
    );

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(partial.as_bytes()).await.unwrap();
    stream.flush().await.unwrap();
    stream
}

/// Read the status line of a raw HTTP response
pub async fn read_status_line(stream: &mut TcpStream) -> String {
    let mut buf = vec![0u8; 1024];
    let n = tokio::time::timeout(Duration::from_secs(10), stream.read(&mut buf))
        .await
        .expect("No response before deadline")
        .unwrap();
    let text = String::from_utf8_lossy(&buf[..n]);
    text.lines().next().unwrap_or_default().to_string()
}

/// Minimal JPEG header (SOI + APP0 JFIF marker) followed by filler bytes
pub fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];
    data.resize(len.max(data.len()), 0xAB);
    data
}
