//! Request counters and delta reporting.
//!
//! # Responsibilities
//! - Count processed and blocked requests per origin label
//! - Produce per-window snapshots for the usage-metrics push
//! - Convert absolute counters into non-negative deltas
//!
//! # Metrics
//! - `processed`: every request the sniff stage evaluated
//! - `dropped`: requests that received a blocking verdict
//!
//! # Design Decisions
//! - Increments take the shared side of one `RwLock` and bump an atomic;
//!   only first sight of a new label and `drain` take it exclusively
//! - How a kind is reported (absolute vs. delta) is a [`ReportingPolicy`],
//!   not a per-name branch
//! - A counter observed going backwards is reported as the size of the drop

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::observability::prometheus;

/// Label used when a request carries no hostname.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// The counters this component tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    Processed,
    Blocked,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::Processed, MetricKind::Blocked];

    /// Name reported to the Local API.
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Processed => "processed",
            MetricKind::Blocked => "dropped",
        }
    }
}

/// How a counter is turned into a reported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingMode {
    /// Report the raw counter.
    Absolute,
    /// Report the change since the previous drain.
    #[default]
    Relative,
}

/// Which kinds are reported, and how.
///
/// Kinds without a mode are skipped during drain.
#[derive(Debug, Clone, Default)]
pub struct ReportingPolicy {
    modes: HashMap<MetricKind, ReportingMode>,
}

impl ReportingPolicy {
    /// A policy that reports nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every kind reported as a delta.
    pub fn relative() -> Self {
        MetricKind::ALL
            .into_iter()
            .fold(Self::empty(), |p, kind| p.with(kind, ReportingMode::Relative))
    }

    pub fn with(mut self, kind: MetricKind, mode: ReportingMode) -> Self {
        self.modes.insert(kind, mode);
        self
    }

    pub fn mode(&self, kind: MetricKind) -> Option<ReportingMode> {
        self.modes.get(&kind).copied()
    }
}

/// Value to report for one counter in one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reported {
    pub value: u64,
    /// The counter went backwards since the last drain.
    pub reset: bool,
}

/// Last reported value per counter.
#[derive(Debug, Default)]
pub struct DeltaTracker {
    last: HashMap<(MetricKind, String), u64>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the reported value for `current` and remember it.
    pub fn observe(
        &mut self,
        kind: MetricKind,
        origin: &str,
        current: u64,
        mode: ReportingMode,
    ) -> Reported {
        match mode {
            ReportingMode::Absolute => Reported { value: current, reset: false },
            ReportingMode::Relative => {
                let previous = self
                    .last
                    .insert((kind, origin.to_string()), current)
                    .unwrap_or(0);
                if current >= previous {
                    Reported { value: current - previous, reset: false }
                } else {
                    Reported { value: previous - current, reset: true }
                }
            }
        }
    }
}

/// One reported counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricItem {
    pub kind: MetricKind,
    pub origin: String,
    pub value: u64,
}

/// Everything reported for one window.
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    /// Seconds since the Unix epoch at drain time.
    pub timestamp: u64,
    pub window: Duration,
    pub items: Vec<MetricItem>,
}

impl MetricSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reported value for one counter, if it was part of this window.
    pub fn value(&self, kind: MetricKind, origin: &str) -> Option<u64> {
        self.items
            .iter()
            .find(|i| i.kind == kind && i.origin == origin)
            .map(|i| i.value)
    }
}

#[derive(Default)]
struct Registry {
    counters: HashMap<(MetricKind, String), AtomicU64>,
    tracker: DeltaTracker,
}

/// Thread-safe registry of per-origin request counters.
///
/// Built once at startup and shared by the request path and the exporter.
pub struct MetricsAggregator {
    registry: RwLock<Registry>,
    policy: ReportingPolicy,
}

impl MetricsAggregator {
    /// Aggregator reporting both counters as deltas.
    pub fn new() -> Self {
        Self::with_policy(ReportingPolicy::relative())
    }

    pub fn with_policy(policy: ReportingPolicy) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            policy,
        }
    }

    pub fn mark_processed(&self, origin: &str) {
        self.increment(MetricKind::Processed, origin);
    }

    pub fn mark_blocked(&self, origin: &str) {
        self.increment(MetricKind::Blocked, origin);
    }

    /// Current absolute value of a counter.
    pub fn value(&self, kind: MetricKind, origin: &str) -> u64 {
        let registry = self.registry.read().expect("metrics registry lock poisoned");
        registry
            .counters
            .get(&(kind, origin_label(origin).to_string()))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn increment(&self, kind: MetricKind, origin: &str) {
        let origin = origin_label(origin);
        prometheus::record(kind, origin);

        {
            let registry = self.registry.read().expect("metrics registry lock poisoned");
            if let Some(counter) = registry.counters.get(&(kind, origin.to_string())) {
                counter.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        let mut registry = self.registry.write().expect("metrics registry lock poisoned");
        registry
            .counters
            .entry((kind, origin.to_string()))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot every tracked counter for a window of `window` length.
    pub fn drain(&self, window: Duration) -> MetricSnapshot {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut guard = self.registry.write().expect("metrics registry lock poisoned");
        let Registry { counters, tracker } = &mut *guard;

        let mut items = Vec::with_capacity(counters.len());
        for ((kind, origin), counter) in counters.iter() {
            let Some(mode) = self.policy.mode(*kind) else {
                tracing::trace!(metric = kind.name(), "Skipping unreported metric");
                continue;
            };

            let current = counter.load(Ordering::Relaxed);
            let reported = tracker.observe(*kind, origin, current, mode);
            if reported.reset {
                tracing::warn!(
                    metric = kind.name(),
                    origin = %origin,
                    current,
                    reported = reported.value,
                    "Counter reset detected, reporting magnitude of the drop"
                );
            }

            items.push(MetricItem {
                kind: *kind,
                origin: origin.clone(),
                value: reported.value,
            });
        }
        drop(guard);

        items.sort_by(|a, b| (a.kind, &a.origin).cmp(&(b.kind, &b.origin)));

        MetricSnapshot { timestamp, window, items }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a hostname into a metric label.
pub fn origin_label(origin: &str) -> &str {
    let trimmed = origin.trim();
    if trimmed.is_empty() {
        UNKNOWN_ORIGIN
    } else {
        trimmed
    }
}
