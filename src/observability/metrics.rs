//! Metrics collection and exposition.
//!
//! # Metrics
//! - `netaware_attempts_total` (counter): transport sends by outcome
//! - `netaware_retries_total` (counter): backoffs taken
//! - `netaware_requests_total` (counter): logical requests by result
//! - `netaware_request_duration_seconds` (histogram): end-to-end latency
//! - `netaware_reachability` (gauge): 1=reachable, 0=unreachable
//! - `netaware_reachability_transitions_total` (counter): flips by direction
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_attempt(outcome: &'static str) {
    counter!("netaware_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_retry() {
    counter!("netaware_retries_total").increment(1);
}

pub fn record_request(result: &'static str, start: Instant) {
    counter!("netaware_requests_total", "result" => result).increment(1);
    histogram!("netaware_request_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_reachability(reachable: bool) {
    gauge!("netaware_reachability").set(if reachable { 1.0 } else { 0.0 });
}

pub fn record_reachability_transition(reachable: bool) {
    let direction = if reachable { "up" } else { "down" };
    counter!("netaware_reachability_transitions_total", "direction" => direction).increment(1);
}
