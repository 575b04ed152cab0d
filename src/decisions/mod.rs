//! Decision source subsystem.
//!
//! # Data Flow
//! ```text
//! Validated client IP
//!     → client.rs (DecisionSource trait)
//!     → lapi.rs (GET /v1/decisions?ip=... against the CrowdSec Local API)
//!     → types.rs (Decision records, DecisionError)
//! ```
//!
//! # Design Decisions
//! - The evaluator depends on the trait, so tests swap in in-memory sources
//! - The client itself carries no deadline logic; the caller bounds each query
//! - Configuration problems surface at construction, before traffic is served

pub mod client;
pub mod lapi;
pub mod types;

pub use client::DecisionSource;
pub use lapi::LapiClient;
pub use types::{Decision, DecisionError, DecisionResult};
