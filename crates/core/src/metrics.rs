//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Catalog engine (fetch outcomes)
//! - Offline queue (enqueues, replays, per-action results, depth)
//! - Connectivity monitor (transitions)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Catalog
// =============================================================================

/// Settled catalog fetches by outcome.
pub static CATALOG_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("storefront_catalog_fetches_total", "Total settled catalog fetches"),
        &["outcome"], // "applied", "stale", "failed"
    )
    .unwrap()
});

// =============================================================================
// Offline queue
// =============================================================================

/// Actions added to the offline queue.
pub static OFFLINE_ACTIONS_ENQUEUED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "storefront_offline_actions_enqueued_total",
        "Total actions added to the offline queue",
    )
    .unwrap()
});

/// Replayed actions by result.
pub static OFFLINE_ACTIONS_REPLAYED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "storefront_offline_actions_replayed_total",
            "Total replayed offline actions",
        ),
        &["result"], // "success", "unreachable", "status", "timeout", "invalid", "panicked"
    )
    .unwrap()
});

/// Replay passes started over a non-empty queue.
pub static QUEUE_REPLAYS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "storefront_queue_replays_started_total",
        "Total replay passes started",
    )
    .unwrap()
});

/// Replay triggers dropped because a replay was already running.
pub static QUEUE_REPLAYS_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "storefront_queue_replays_skipped_total",
        "Total replay triggers dropped while another replay was running",
    )
    .unwrap()
});

/// Duration of a replay pass in seconds.
pub static QUEUE_REPLAY_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "storefront_queue_replay_duration_seconds",
            "Duration of offline queue replay passes",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

/// Actions currently queued, as of the last write.
pub static QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("storefront_queue_depth", "Actions waiting in the offline queue").unwrap()
});

// =============================================================================
// Connectivity
// =============================================================================

/// Connectivity transitions by new state.
pub static CONNECTIVITY_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "storefront_connectivity_transitions_total",
            "Total connectivity state changes",
        ),
        &["state"], // "online", "offline"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Catalog
        Box::new(CATALOG_FETCHES.clone()),
        // Offline queue
        Box::new(OFFLINE_ACTIONS_ENQUEUED.clone()),
        Box::new(OFFLINE_ACTIONS_REPLAYED.clone()),
        Box::new(QUEUE_REPLAYS_STARTED.clone()),
        Box::new(QUEUE_REPLAYS_SKIPPED.clone()),
        Box::new(QUEUE_REPLAY_DURATION.clone()),
        Box::new(QUEUE_DEPTH.clone()),
        // Connectivity
        Box::new(CONNECTIVITY_TRANSITIONS.clone()),
    ]
}
