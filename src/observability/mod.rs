//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request path:
//!     → logging.rs (structured log events)
//!     → metrics.rs (per-origin processed/blocked counters)
//!         → prometheus.rs (optional scrape endpoint mirror)
//!
//! Every push interval:
//!     exporter.rs → MetricsAggregator::drain → SnapshotSink (Local API)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap (atomic increments under a shared lock)
//! - The aggregator is an owned instance passed by `Arc`, not a global
//! - Lost push windows are acceptable; delta state is never rolled back

pub mod exporter;
pub mod logging;
pub mod metrics;
pub mod prometheus;

pub use exporter::{SnapshotSink, UsageReporter};
pub use metrics::{MetricKind, MetricSnapshot, MetricsAggregator, ReportingMode, ReportingPolicy};
