//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Indexer fetch attempts and cycle duration
//! - Record formatting (lines generated, records skipped)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Fetch Metrics
// =============================================================================

/// Indexer list requests by outcome.
pub static FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jackett_bridge_fetch_attempts_total",
            "Indexer list requests sent to Jackett",
        ),
        &["result"], // "success" or a failure kind
    )
    .unwrap()
});

/// Duration of a whole fetch cycle, session setup and retries included.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "jackett_bridge_fetch_duration_seconds",
            "Duration of an indexer fetch cycle",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Formatter Metrics
// =============================================================================

/// Config lines generated.
pub static CONFIG_LINES_GENERATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "jackett_bridge_config_lines_generated_total",
        "Config lines generated from Jackett indexers",
    )
    .unwrap()
});

/// Records dropped during formatting.
pub static RECORDS_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "jackett_bridge_records_skipped_total",
            "Indexer records that produced no config line",
        ),
        &["reason"], // "invalid", "unselected", "duplicate", "encode"
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FETCH_ATTEMPTS.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(CONFIG_LINES_GENERATED.clone()),
        Box::new(RECORDS_SKIPPED.clone()),
    ]
}
