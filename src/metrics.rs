//! Production observability metrics
//!
//! Low-overhead counters and histograms for request outcomes, cache
//! effectiveness, and bulk import throughput, built on the `metrics`
//! facade. Recording without an installed recorder is a no-op, so the
//! library instruments unconditionally and the binary decides whether to
//! install the Prometheus exporter.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

static METRICS_INSTALLED: OnceCell<()> = OnceCell::new();

/// Install the Prometheus exporter and register metric descriptions.
///
/// Call once at application startup; subsequent calls are no-ops.
pub fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INSTALLED.get().is_some() {
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "api_requests_total",
        Unit::Count,
        "Total HTTP requests dispatched to the remote API"
    );

    describe_histogram!(
        "api_request_duration_seconds",
        Unit::Seconds,
        "HTTP request duration in seconds"
    );

    describe_counter!(
        "api_rate_limited_total",
        Unit::Count,
        "Total 429 responses received from the remote API"
    );

    describe_counter!(
        "cache_hits_total",
        Unit::Count,
        "Cache hits by tier (entity, response, search, move, bulk)"
    );

    describe_counter!(
        "cache_misses_total",
        Unit::Count,
        "Cache misses by tier (entity, response, search, move, bulk)"
    );

    describe_counter!(
        "bulk_items_total",
        Unit::Count,
        "Bulk import items by outcome (imported, skipped)"
    );

    let _ = METRICS_INSTALLED.set(());
    info!(%addr, "metrics exporter installed");
    Ok(())
}

/// Record one dispatched API request with its outcome and duration.
pub fn record_api_request(endpoint: &str, status: &str, duration: Duration) {
    counter!(
        "api_requests_total",
        "endpoint" => endpoint.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);

    histogram!(
        "api_request_duration_seconds",
        "endpoint" => endpoint.to_string(),
    )
    .record(duration.as_secs_f64());
}

/// Record a 429 response from the remote API.
pub fn record_rate_limited(endpoint: &str) {
    counter!(
        "api_rate_limited_total",
        "endpoint" => endpoint.to_string(),
    )
    .increment(1);
}

/// Record a cache hit for the given tier.
pub fn record_cache_hit(tier: &'static str) {
    counter!("cache_hits_total", "tier" => tier).increment(1);
}

/// Record a cache miss for the given tier.
pub fn record_cache_miss(tier: &'static str) {
    counter!("cache_misses_total", "tier" => tier).increment(1);
}

/// Record one processed bulk import item.
pub fn record_bulk_item(imported: bool) {
    let outcome = if imported { "imported" } else { "skipped" };
    counter!("bulk_items_total", "outcome" => outcome).increment(1);
}
