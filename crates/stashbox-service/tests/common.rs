//! Common test utilities for stashbox integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::multipart::Part;
use axum_test::TestServer;
use tempfile::TempDir;

use stashbox_core::UserId;
use stashbox_service::{create_router, AppState, BlobStore, ServiceConfig};
use stashbox_store::RocksStore;

/// Gateway key secret used by the harness; tests sign payloads with it.
pub const TEST_GATEWAY_SECRET: &str = "test_key_secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for database and uploads (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test user ID for authenticated requests.
    pub test_user_id: UserId,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and upload directory.
    pub fn new() -> Self {
        Self::with_gateway_url("http://localhost:1")
    }

    /// Create a harness whose gateway client points at the given base URL
    /// (typically a wiremock server).
    pub fn with_gateway_url(gateway_base_url: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().join("data").to_string_lossy().to_string(),
            upload_dir: temp_dir
                .path()
                .join("uploads")
                .to_string_lossy()
                .to_string(),
            auth_base_url: "http://localhost:1".into(),
            allow_test_tokens: true,
            gateway_base_url: gateway_base_url.into(),
            gateway_key_id: Some("test_key_id".into()),
            gateway_key_secret: Some(TEST_GATEWAY_SECRET.into()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let store = RocksStore::open(&config.data_dir).expect("Failed to open store");
        let blobs = BlobStore::open(&config.upload_dir).expect("Failed to open blob store");

        let state = AppState::new(Arc::new(store), Arc::new(blobs), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");
        let test_user_id = UserId::generate();

        Self {
            server,
            _temp_dir: temp_dir,
            test_user_id,
        }
    }

    /// Get the authorization header for user authentication.
    pub fn user_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_user_id)
    }

    /// Get a different user's auth header (for testing isolation).
    pub fn other_user_auth_header() -> String {
        let other_user = UserId::generate();
        format!("Bearer test-token:{other_user}")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a text-file multipart part with the given name and contents.
pub fn text_part(file_name: &str, contents: &[u8]) -> Part {
    Part::bytes(contents.to_vec())
        .file_name(file_name)
        .mime_type("text/plain")
}
