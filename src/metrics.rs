//! Prometheus metrics for listing fetches.
//!
//! This module provides metrics for:
//! - Market listing fetch latency
//! - Fetches started and failed (by failure kind)

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::error::FetchErrorKind;

// === Metric Name Constants ===

/// Market listing fetch latency metric name.
pub const METRIC_MARKET_FETCH_LATENCY: &str = "market_fetch_latency_ms";
/// Market listing fetches counter metric name.
pub const METRIC_MARKET_FETCHES: &str = "market_fetches_total";
/// Failed market listing fetches counter metric name.
pub const METRIC_MARKET_FETCH_FAILURES: &str = "market_fetch_failures_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_MARKET_FETCH_LATENCY,
        "Market listing fetch latency in milliseconds"
    );
    describe_counter!(
        METRIC_MARKET_FETCHES,
        "Total number of market listing fetches started"
    );
    describe_counter!(
        METRIC_MARKET_FETCH_FAILURES,
        "Total number of market listing fetches that failed"
    );

    debug!("Metrics initialized");
}

/// Increment market fetches counter.
pub fn inc_market_fetches() {
    counter!(METRIC_MARKET_FETCHES).increment(1);
}

/// Increment failed fetches counter for a failure kind.
pub fn inc_market_fetch_failures(kind: FetchErrorKind) {
    let label: &'static str = kind.into();
    counter!(METRIC_MARKET_FETCH_FAILURES, "kind" => label).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a market listing fetch.
pub fn timer_market_fetch() -> LatencyTimer {
    LatencyTimer::new(METRIC_MARKET_FETCH_LATENCY)
}
