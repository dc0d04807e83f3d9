//! Metrics collection and exposition.
//!
//! # Metrics
//! - `minter_http_requests_total` (counter): requests by method, route, status
//! - `minter_http_request_duration_seconds` (histogram): handler latency
//! - `minter_mints_total` (counter): mint outcomes (confirmed, rejected, failed)
//! - `minter_mint_duration_seconds` (histogram): end-to-end mint latency
//! - `minter_rpc_calls_total` (counter): RPC calls by method and outcome
//! - `minter_rate_limited_total` (counter): rejected by the rate limiter
//! - `minter_ledger_healthy` (gauge): 1=healthy, 0=unhealthy
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("minter_http_requests_total", &labels).increment(1);
    histogram!("minter_http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_mint(outcome: &'static str, start: Instant) {
    counter!("minter_mints_total", "outcome" => outcome).increment(1);
    histogram!("minter_mint_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rpc_call(method: &str, outcome: &'static str) {
    counter!(
        "minter_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("minter_rate_limited_total", "reason" => reason).increment(1);
}

pub fn record_ledger_health(healthy: bool) {
    gauge!("minter_ledger_healthy").set(if healthy { 1.0 } else { 0.0 });
}
