//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Decision query:
//!     → timeouts.rs (deadline measured from the start of evaluation)
//!     → On expiry: DecisionError::Timeout → evaluator fails open
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries on the request path; a slow decision source must not
//!   multiply request latency

pub mod timeouts;
