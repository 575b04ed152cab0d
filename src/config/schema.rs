//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bouncer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::observability::metrics::{MetricKind, ReportingMode, ReportingPolicy};

/// Root configuration for the bouncer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BouncerConfig {
    /// Local API connection settings.
    pub crowdsec: CrowdsecConfig,

    /// Which client-address headers to trust.
    pub trust: TrustConfig,

    /// Listener for the host's sniff/capture callbacks.
    pub listener: ListenerConfig,

    /// Usage metrics pushed to the Local API.
    pub usage_metrics: UsageMetricsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Local API connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CrowdsecConfig {
    /// Bouncer API key (`cscli bouncers add`).
    pub api_key: String,

    /// Local API base URL (e.g., "http://127.0.0.1:8080/").
    pub agent_url: String,

    /// User-Agent sent with every request.
    pub user_agent: String,
}

impl Default for CrowdsecConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            agent_url: "http://127.0.0.1:8080/".to_string(),
            user_agent: format!("crowdsec-gate/v{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Client identity trust settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrustConfig {
    /// The proxy sits behind Cloudflare, so `CF-Connecting-IP` is matched
    /// under any casing.
    #[serde(alias = "is_proxied_behind_cloudflare")]
    pub proxied_behind_edge_cdn: bool,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:9280").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9280".to_string(),
        }
    }
}

/// Usage metrics push configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsageMetricsConfig {
    /// Push usage metrics to the Local API.
    pub enabled: bool,

    /// Push interval in seconds.
    pub push_interval_secs: u64,

    /// Reporting mode for the processed counter.
    pub processed_mode: ReportingMode,

    /// Reporting mode for the blocked counter.
    pub blocked_mode: ReportingMode,
}

impl UsageMetricsConfig {
    pub fn policy(&self) -> ReportingPolicy {
        ReportingPolicy::empty()
            .with(MetricKind::Processed, self.processed_mode)
            .with(MetricKind::Blocked, self.blocked_mode)
    }
}

impl Default for UsageMetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            push_interval_secs: 900,
            processed_mode: ReportingMode::Relative,
            blocked_mode: ReportingMode::Relative,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable Prometheus metrics endpoint.
    pub prometheus_enabled: bool,

    /// Prometheus endpoint bind address.
    pub prometheus_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            prometheus_enabled: false,
            prometheus_address: "127.0.0.1:9281".to_string(),
        }
    }
}
