//! Metrics collection and exposition.
//!
//! # Metrics
//! - `inscriber_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `inscriber_rpc_duration_seconds` (histogram): RPC latency by method
//! - `inscriber_transfers_total` (counter): pipeline runs by outcome
//! - `inscriber_nonce_fallbacks_total` (counter): nonce lookups replaced by zero

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_rpc_call(method: &'static str, ok: bool, elapsed: Duration) {
    let outcome = if ok { "ok" } else { "error" };
    ::metrics::counter!("inscriber_rpc_requests_total", "method" => method, "outcome" => outcome)
        .increment(1);
    ::metrics::histogram!("inscriber_rpc_duration_seconds", "method" => method)
        .record(elapsed.as_secs_f64());
}

/// `outcome` is one of `broadcast`, `rejected` or `invalid`.
pub fn record_transfer(outcome: &'static str) {
    ::metrics::counter!("inscriber_transfers_total", "outcome" => outcome).increment(1);
}

pub fn record_nonce_fallback() {
    ::metrics::counter!("inscriber_nonce_fallbacks_total").increment(1);
}
