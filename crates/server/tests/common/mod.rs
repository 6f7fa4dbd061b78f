//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with mock collaborators injected, so the HTTP surface can be exercised
//! without a network.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use storefront_core::{
    testing::{ManualConnectivity, MockActionExecutor, MockProductSource},
    ActionExecutor, CatalogEngine, Config, ConnectivityMonitor, DatabaseConfig, DurableStore,
    OfflineQueue, ProductSource, SortKey, SqliteDurableStore,
};

/// Re-export fixtures for test convenience
pub use storefront_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_enqueue() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/queue", json!({ "url": "/orders" })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock data source - seeded with the sample farm products
    pub source: Arc<MockProductSource>,
    /// Mock executor - control replay results
    pub executor: Arc<MockActionExecutor>,
    /// Manually driven connectivity
    pub connectivity: Arc<ManualConnectivity>,
    /// The offline queue behind the router
    pub queue: Arc<OfflineQueue>,
    /// Temporary directory for the test database
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
    /// Create a new test fixture with a 5-item page size.
    pub async fn new() -> Self {
        Self::with_page_size(5).await
    }

    pub async fn with_page_size(page_size: u32) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let source = Arc::new(MockProductSource::with_products(
            fixtures::sample_products(),
        ));
        let executor = Arc::new(MockActionExecutor::new());
        let connectivity = Arc::new(ManualConnectivity::new(false));

        let mut config = Config {
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            ..Default::default()
        };
        config.catalog.page_size = page_size;
        config.server.port = 0; // Not used for in-process testing

        let store: Arc<dyn DurableStore> =
            Arc::new(SqliteDurableStore::new(&db_path).expect("Failed to create store"));
        let queue = Arc::new(OfflineQueue::new(store, config.queue.storage_key.clone()));
        let catalog = Arc::new(CatalogEngine::new(
            Arc::clone(&source) as Arc<dyn ProductSource>,
            page_size,
            SortKey::PriceAsc,
        ));

        let state = Arc::new(storefront_server::state::AppState::new(
            config,
            catalog,
            Arc::clone(&queue),
            Arc::clone(&executor) as Arc<dyn ActionExecutor>,
            Arc::clone(&connectivity) as Arc<dyn ConnectivityMonitor>,
        ));

        let router = storefront_server::api::create_router(state);

        Self {
            router,
            source,
            executor,
            connectivity,
            queue,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
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
