//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Sniff request (headers + remote address):
//!     → headers.rs (single-value lookup, case-insensitive fallback)
//!     → client_ip.rs (trust-ordered source selection, port stripping, IP validation)
//!     → validated IpAddr handed to the evaluator
//! ```
//!
//! # Design Decisions
//! - Identity is recomputed per request, never cached
//! - Resolution is pure apart from debug logging
//! - Failures are typed so the evaluator can fail open

pub mod client_ip;
pub mod headers;

pub use client_ip::{resolve_client_ip, IdentityError};
pub use headers::{HeaderLookup, HeaderMap};
