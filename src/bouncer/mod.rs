//! Admission decision subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (headers, remote address, CDN trust flag, origin)
//!     → security::client_ip (validated IpAddr)
//!     → decisions::DecisionSource (bounded by resilience::timeouts)
//!     → evaluator.rs (Verdict, metrics)
//! ```
//!
//! # Design Decisions
//! - One evaluation per request, no shared state besides the metrics registry
//! - Verdicts keep the host's naming: `Accept` blocks, `Skip` allows

pub mod evaluator;
pub mod verdict;

pub use evaluator::RequestEvaluator;
pub use verdict::{RequestContext, Verdict};
