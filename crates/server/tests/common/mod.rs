//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that builds the full router in
//! process, with a scripted [`MockTransport`] standing in for Jackett.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use jackett_bridge_core::{
    config::JackettConfig, testing::MockTransport, ApiGuard, AuthMethod, Config,
    ConfigGenerator, IndexerFetchClient, RetryPolicy, Transport,
};

/// Re-export fixtures for test convenience
pub use jackett_bridge_core::testing::fixtures;

/// Path the mock transport answers the indexer list on.
pub const INDEXERS: &str = "/api/v2.0/indexers";

/// Test fixture for E2E testing with a mocked Jackett.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_generation() {
///     let fixture = TestFixture::new();
///     fixture.transport.push_json(INDEXERS, 200, fixtures::indexer_list(&[("1337x", "1337x")]));
///
///     let response = fixture.get("/api/v1/jackett/list_custom_configs").await;
///     assert_eq!(response.body["code"], 0);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock transport - script Jackett responses
    pub transport: Arc<MockTransport>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with an enabled, configured Jackett.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let transport = Arc::new(MockTransport::new());

        let mut config = Config::default();
        config.jackett = test_config.jackett;
        if let Some(key) = test_config.api_key {
            config.auth.method = AuthMethod::ApiKey;
            config.auth.api_key = Some(key);
        }

        let guard = ApiGuard::from_config(&config.auth).expect("Failed to create guard");
        let fetcher = IndexerFetchClient::new(
            Arc::clone(&transport) as Arc<dyn Transport>,
            RetryPolicy::new(config.fetch.max_attempts, Duration::ZERO),
            "jackett-bridge-test",
        );
        let generator = Arc::new(ConfigGenerator::new(fetcher, config.jackett.clone()));

        let state = Arc::new(jackett_bridge_server::AppState::new(config, guard, generator));
        let router = jackett_bridge_server::create_router(state);

        Self { router, transport }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.get_with_headers(path, &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut request_builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }
        let request = request_builder.body(Body::empty()).unwrap();

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
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Jackett settings handed to the generator
    pub jackett: JackettConfig,
    /// Require this API key on protected routes
    pub api_key: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jackett: fixtures::jackett_settings(),
            api_key: None,
        }
    }
}

impl TestConfig {
    /// Create config with the API key guard enabled.
    pub fn with_api_key(key: &str) -> Self {
        Self {
            api_key: Some(key.to_string()),
            ..Self::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
