//! Periodic usage-metrics push.
//!
//! # Responsibilities
//! - Drain the aggregator once per push interval
//! - Hand non-empty snapshots to a sink (the Local API in production)
//! - Stop on shutdown without a final pass

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{self, Instant};

use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics::{MetricSnapshot, MetricsAggregator};

/// Errors returned by a snapshot sink.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("snapshot rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Destination for drained snapshots.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn send(&self, snapshot: &MetricSnapshot) -> Result<(), ExportError>;
}

/// Background task that drains and pushes metrics.
pub struct UsageReporter {
    aggregator: Arc<MetricsAggregator>,
    sink: Arc<dyn SnapshotSink>,
    interval: Duration,
}

impl UsageReporter {
    pub fn new(
        aggregator: Arc<MetricsAggregator>,
        sink: Arc<dyn SnapshotSink>,
        interval: Duration,
    ) -> Self {
        Self {
            aggregator,
            sink,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Usage metrics reporter starting"
        );

        // First push covers a full window.
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.report().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Usage metrics reporter received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Drain one window and push it. Returns whether anything was sent.
    pub async fn report(&self) -> bool {
        let snapshot = self.aggregator.drain(self.interval);
        if snapshot.is_empty() {
            tracing::debug!("No metrics to report");
            return false;
        }

        match self.sink.send(&snapshot).await {
            Ok(()) => {
                tracing::debug!(items = snapshot.items.len(), "Usage metrics pushed");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to push usage metrics, window dropped");
                false
            }
        }
    }
}
