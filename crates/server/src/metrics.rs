//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the storefront server:
//! - HTTP request metrics (latency, counts)
//! - Catalog, cart and connectivity state (collected dynamically)
//! - Core engine metrics (re-registered from `storefront_core::metrics`)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "storefront_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("storefront_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "storefront_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// State Metrics (collected dynamically)
// =============================================================================

/// Products in the catalog working set.
pub static CATALOG_WORKING_SET: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "storefront_catalog_working_set",
        "Number of products currently in the catalog working set",
    )
    .unwrap()
});

/// Units in the cart.
pub static CART_ITEMS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("storefront_cart_items", "Number of units in the cart").unwrap()
});

/// Connectivity state (1 = online, 0 = offline).
pub static CONNECTIVITY_ONLINE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "storefront_connectivity_online",
        "Whether the network is reachable (1) or not (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // State
    registry
        .register(Box::new(CATALOG_WORKING_SET.clone()))
        .unwrap();
    registry.register(Box::new(CART_ITEMS.clone())).unwrap();
    registry
        .register(Box::new(CONNECTIVITY_ONLINE.clone()))
        .unwrap();

    // Core metrics (catalog, offline queue, connectivity)
    for metric in storefront_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect current values.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    CATALOG_WORKING_SET.set(state.catalog().products().len() as i64);
    CART_ITEMS.set(i64::from(state.cart().read().await.item_count()));
    CONNECTIVITY_ONLINE.set(if state.connectivity().is_connected() { 1 } else { 0 });

    if let Ok(depth) = state.queue().len().await {
        storefront_core::metrics::QUEUE_DEPTH.set(depth as i64);
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let uuid_regex = regex_lite::Regex::new(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
    )
    .unwrap();
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();

    let result = uuid_regex.replace_all(path, "{id}");
    let result = numeric_regex.replace_all(&result, "/{id}$1");
    result.to_string()
}
