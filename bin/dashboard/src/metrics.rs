//! Prometheus metrics for the dashboard.
//!
//! All metrics are aggregated in the [`Metrics`] struct. Without an
//! installed exporter the calls are no-ops.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Aggregated metrics for the dashboard.
#[derive(Debug, Clone)]
pub struct Metrics {
    _private: (),
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance and register all metric descriptions.
    pub fn new() -> Self {
        Self::register_descriptions();
        Self { _private: () }
    }

    fn register_descriptions() {
        describe_counter!(
            "dashboard_connects_total",
            "Wallet connect attempts by result"
        );
        describe_counter!(
            "dashboard_disconnects_total",
            "Wallet disconnects requested by the user"
        );
        describe_counter!(
            "dashboard_transfers_total",
            "Token transfers by final status"
        );
        describe_histogram!(
            "dashboard_transfer_duration_seconds",
            "Time from submission to confirmation or failure"
        );
        describe_counter!(
            "dashboard_reloads_total",
            "Application rebuilds caused by chain changes"
        );
    }

    /// Record a settled connect attempt.
    pub fn record_connect(&self, connected: bool) {
        let result = if connected { "success" } else { "failure" };
        counter!("dashboard_connects_total", "result" => result).increment(1);
    }

    pub fn record_disconnect(&self) {
        counter!("dashboard_disconnects_total").increment(1);
    }

    /// Record a settled transfer.
    pub fn record_transfer(&self, confirmed: bool, duration: Duration) {
        let status = if confirmed { "confirmed" } else { "failed" };
        counter!("dashboard_transfers_total", "status" => status).increment(1);
        histogram!("dashboard_transfer_duration_seconds").record(duration.as_secs_f64());
    }

    pub fn record_reload(&self) {
        counter!("dashboard_reloads_total").increment(1);
    }
}

/// Install the Prometheus metrics exporter and start the HTTP server.
///
/// Returns an error if the server fails to bind to the specified port.
pub fn install_prometheus_exporter(port: u16) -> eyre::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::net::SocketAddr;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| eyre::eyre!("Failed to install Prometheus exporter: {}", e))?;

    Ok(())
}
