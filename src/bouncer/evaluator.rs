//! Request evaluation.
//!
//! # Responsibilities
//! - Resolve the client address for a request
//! - Query the decision source under a fixed deadline
//! - Turn the result into a verdict and record metrics
//!
//! # Design Decisions
//! - Fail open: resolution and query failures yield `Skip`
//! - Any decision blocks, whatever its type, scope or duration
//! - The representative ban is only used for logging

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::bouncer::verdict::{RequestContext, Verdict};
use crate::decisions::types::representative;
use crate::decisions::DecisionSource;
use crate::observability::metrics::{origin_label, MetricsAggregator};
use crate::resilience::timeouts::{query_with_deadline, EVALUATION_TIMEOUT};
use crate::security::client_ip::resolve_client_ip;

/// Decides whether a request should be blocked.
#[derive(Clone)]
pub struct RequestEvaluator {
    source: Arc<dyn DecisionSource>,
    metrics: Arc<MetricsAggregator>,
    timeout: Duration,
}

impl RequestEvaluator {
    pub fn new(source: Arc<dyn DecisionSource>, metrics: Arc<MetricsAggregator>) -> Self {
        Self {
            source,
            metrics,
            timeout: EVALUATION_TIMEOUT,
        }
    }

    /// Override the evaluation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    /// Evaluate one request. Always produces a verdict.
    pub async fn evaluate(&self, ctx: &RequestContext) -> Verdict {
        let deadline = Instant::now() + self.timeout;
        let origin = origin_label(&ctx.origin);
        self.metrics.mark_processed(origin);

        let ip = match resolve_client_ip(ctx) {
            Ok(ip) => ip,
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    uri = %ctx.request_uri,
                    error = %e,
                    "Could not resolve client IP"
                );
                return Verdict::Skip;
            }
        };

        let decisions =
            match query_with_deadline(deadline, self.timeout, self.source.query(ip)).await {
                Ok(decisions) => decisions,
                Err(e) => {
                    tracing::warn!(
                        request_id = %ctx.request_id,
                        ip = %ip,
                        error = %e,
                        "Error getting decisions"
                    );
                    return Verdict::Skip;
                }
            };

        if decisions.is_empty() {
            tracing::debug!(ip = %ip, "No decision found");
            return Verdict::Skip;
        }

        for d in &decisions {
            tracing::debug!(
                ip = %d.value,
                scenario = %d.scenario,
                duration = %d.duration,
                scope = %d.scope,
                kind = %d.kind,
                "Decision"
            );
        }

        let scenario = representative(&decisions).map(|d| d.scenario.as_str());
        tracing::info!(
            request_id = %ctx.request_id,
            ip = %ip,
            origin = %origin,
            scenario = ?scenario,
            decisions = decisions.len(),
            "Decision found, blocking request"
        );
        self.metrics.mark_blocked(origin);

        Verdict::Accept
    }
}
