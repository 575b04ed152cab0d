//! CrowdSec bouncer for a reverse proxy's sniff/capture plugin hooks.

pub mod bouncer;
pub mod config;
pub mod decisions;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use bouncer::{RequestContext, RequestEvaluator, Verdict};
pub use config::schema::BouncerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use observability::MetricsAggregator;
