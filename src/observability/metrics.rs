//! Metrics collection and exposition.
//!
//! # Metrics
//! - `service_watcher_cycles_total` (counter): cycles by outcome
//! - `service_watcher_endpoints` (gauge): size of the last applied set
//! - `service_watcher_reloads_total` (counter): reloads by result
//! - `service_watcher_apply_failures_total` (counter): render/write failures by stage
//! - `service_watcher_cycle_duration_seconds` (histogram): cycle latency
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Count one finished cycle (`unchanged`, `applied`, `fetch_failed`).
pub fn record_cycle(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("service_watcher_cycles_total", "outcome" => outcome).increment(1);
    metrics::histogram!("service_watcher_cycle_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_endpoints(count: usize) {
    metrics::gauge!("service_watcher_endpoints").set(count as f64);
}

pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("service_watcher_reloads_total", "result" => result).increment(1);
}

/// Count a render or write failure.
pub fn record_apply_failure(stage: &'static str) {
    metrics::counter!("service_watcher_apply_failures_total", "stage" => stage).increment(1);
}
