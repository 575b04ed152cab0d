//! Prometheus exposition of the request counters.
//!
//! Counters go through the `metrics` facade, so they cost nothing until a
//! recorder is installed with [`init_metrics`].

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::observability::metrics::MetricKind;

pub const PROCESSED_TOTAL: &str = "bouncer_processed_requests_total";
pub const BLOCKED_TOTAL: &str = "bouncer_blocked_requests_total";

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    let builder = PrometheusBuilder::new().with_http_listener(addr);

    match builder.install() {
        Ok(()) => {
            metrics::describe_counter!(PROCESSED_TOTAL, "Requests evaluated by the bouncer");
            metrics::describe_counter!(BLOCKED_TOTAL, "Requests blocked by the bouncer");
            tracing::info!(address = %addr, "Prometheus metrics endpoint started");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
        }
    }
}

pub(crate) fn record(kind: MetricKind, origin: &str) {
    let name = match kind {
        MetricKind::Processed => PROCESSED_TOTAL,
        MetricKind::Blocked => BLOCKED_TOTAL,
    };
    metrics::counter!(name, "origin" => origin.to_string()).increment(1);
}
