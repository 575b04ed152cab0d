//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BouncerConfig (validated, immutable)
//!     → shared by value/Arc with the subsystems at startup
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup; there is no reload path
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BouncerConfig;
pub use schema::CrowdsecConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::TrustConfig;
pub use schema::UsageMetricsConfig;
