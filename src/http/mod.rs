//! HTTP surface for the host proxy's plugin callbacks.
//!
//! # Data Flow
//! ```text
//! Host proxy
//!     → server.rs (POST /d_sniff)
//!     → request.rs (JSON payload → RequestContext)
//!     → bouncer::RequestEvaluator
//!     → response.rs (200 accept / 501 skip)
//!
//! Accepted requests come back on /d_capture
//!     → response.rs (403 Forbidden)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::SniffRequest;
pub use server::{AppState, HttpServer, CAPTURE_PATH, SNIFF_PATH};
