//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock media tool injected, so the upload form can be exercised
//! without ffmpeg installed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mp4trim_core::{
    config::{RetentionConfig, ServerConfig, StorageConfig, UploadConfig},
    testing::MockMediaTool,
    Config, MediaTool, StorageLayout,
};

/// Re-export fixtures for test convenience
pub use mp4trim_core::testing::fixtures;

/// Boundary used by [`MultipartBody`].
const BOUNDARY: &str = "----mp4trim-test-boundary";

/// Test fixture for API testing with a mock media tool.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_clip() {
///     let fixture = TestFixture::new().await;
///
///     let form = MultipartBody::new()
///         .file("video", "in.mp4", "video/mp4", b"...")
///         .text("end_time", "00:00:05");
///     let response = fixture.post_form("/api/v1/clips", form).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock media tool - configure probe results and failures
    pub tool: Arc<MockMediaTool>,
    /// Storage layout the router writes into
    pub layout: StorageLayout,
    /// Temporary directory holding the storage root
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with default settings.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage_root = temp_dir.path().join("media");

        let mut config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            storage: StorageConfig {
                root: storage_root.clone(),
            },
            upload: UploadConfig {
                max_bytes: test_config.max_upload_bytes,
            },
            retention: RetentionConfig {
                sweep_on_request: test_config.sweep_on_request,
                ..Default::default()
            },
            ..Default::default()
        };
        config.media.generate_thumbnails = test_config.generate_thumbnails;

        let tool = Arc::new(MockMediaTool::new());
        tool.set_default_media_info(fixtures::media_info("/unused", 10.0, 1920, 1080))
            .await;

        let state = Arc::new(mp4trim_server::state::AppState::new(
            config,
            Arc::clone(&tool) as Arc<dyn MediaTool>,
        ));
        state
            .layout()
            .ensure_all()
            .await
            .expect("Failed to create storage dirs");

        let router = mp4trim_server::api::create_router(state);

        Self {
            router,
            tool,
            layout: StorageLayout::new(storage_root),
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method("GET").uri(path).body(Body::empty()).unwrap())
            .await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method("POST").uri(path).body(Body::empty()).unwrap())
            .await
    }

    /// Send a POST request with a multipart form body.
    pub async fn post_form(&self, path: &str, form: MultipartBody) -> TestResponse {
        let (content_type, body) = form.finish();
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with raw body and custom content type.
    pub async fn post_with_content_type(
        &self,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }

    /// Number of regular files in a storage directory.
    pub fn file_count(&self, dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().is_file())
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub max_upload_bytes: u64,
    pub sweep_on_request: bool,
    pub generate_thumbnails: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 1024 * 1024,
            sweep_on_request: true,
            generate_thumbnails: false,
        }
    }
}

impl TestConfig {
    /// Create config with a small upload limit.
    pub fn with_upload_limit(max_upload_bytes: u64) -> Self {
        Self {
            max_upload_bytes,
            ..Default::default()
        }
    }

    /// Create config with thumbnails enabled.
    pub fn with_thumbnails() -> Self {
        Self {
            generate_thumbnails: true,
            ..Default::default()
        }
    }
}

/// Hand-built `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    /// Add a file field.
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add an MP4 upload with placeholder contents.
    pub fn mp4(self, file_name: &str) -> Self {
        self.file("video", file_name, "video/mp4", b"\x00\x00\x00\x18ftypmp42 test")
    }

    /// Returns the content type header and the encoded body.
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            self.body,
        )
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
