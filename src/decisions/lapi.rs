//! CrowdSec Local API client.
//!
//! # Responsibilities
//! - Query active decisions for an address (`GET /v1/decisions?ip=`)
//! - Push usage metrics for this remediation component (`POST /v1/usage-metrics`)
//! - Validate endpoint and credentials once at startup

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::config::CrowdsecConfig;
use crate::decisions::client::DecisionSource;
use crate::decisions::types::{Decision, DecisionError, DecisionResult};
use crate::observability::exporter::{ExportError, SnapshotSink};
use crate::observability::metrics::MetricSnapshot;

/// Remediation component type reported to the Local API.
pub const BOUNCER_TYPE: &str = "crowdsec-gate";

const API_KEY_HEADER: &str = "X-Api-Key";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Local API.
#[derive(Clone)]
pub struct LapiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    startup_timestamp: u64,
    os_version: String,
}

impl LapiClient {
    /// Build a client from configuration.
    ///
    /// Fails on a missing API key or an unusable agent URL.
    pub fn new(config: &CrowdsecConfig) -> DecisionResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DecisionError::InvalidConfig("api_key is empty".into()));
        }

        let mut base_url: Url = config.agent_url.parse().map_err(|e| {
            DecisionError::InvalidConfig(format!("invalid agent_url '{}': {}", config.agent_url, e))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(DecisionError::InvalidConfig(format!(
                "agent_url must be http or https, got '{}'",
                base_url.scheme()
            )));
        }
        // Relative joins replace the last path segment unless it ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DecisionError::InvalidConfig(e.to_string()))?;

        tracing::info!(agent_url = %base_url, "Local API client initialized");

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.clone(),
            startup_timestamp: unix_now(),
            os_version: os_version(),
        })
    }

    fn endpoint(&self, path: &str) -> DecisionResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| DecisionError::InvalidConfig(e.to_string()))
    }

    fn usage_payload<'a>(&'a self, snapshot: &'a MetricSnapshot) -> UsageMetrics<'a> {
        let items = snapshot
            .items
            .iter()
            .map(|item| UsageItem {
                name: item.kind.name(),
                value: item.value,
                unit: "request",
                labels: BTreeMap::from([("origin", item.origin.as_str())]),
            })
            .collect();

        UsageMetrics {
            remediation_components: vec![RemediationComponent {
                kind: BOUNCER_TYPE,
                name: BOUNCER_TYPE,
                version: env!("CARGO_PKG_VERSION"),
                utc_startup_timestamp: self.startup_timestamp,
                os: OsInfo {
                    name: std::env::consts::OS,
                    version: &self.os_version,
                },
                feature_flags: Vec::new(),
                metrics: vec![DetailedMetrics {
                    meta: MetricsMeta {
                        window_size_seconds: snapshot.window.as_secs(),
                        utc_now_timestamp: snapshot.timestamp,
                    },
                    items,
                }],
            }],
        }
    }
}

#[async_trait]
impl DecisionSource for LapiClient {
    async fn query(&self, ip: IpAddr) -> DecisionResult<Vec<Decision>> {
        let mut url = self.endpoint("v1/decisions")?;
        url.query_pairs_mut().append_pair("ip", &ip.to_string());

        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| DecisionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DecisionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DecisionError::Transport(e.to_string()))?;
        parse_decisions(&body)
    }
}

#[async_trait]
impl SnapshotSink for LapiClient {
    async fn send(&self, snapshot: &MetricSnapshot) -> Result<(), ExportError> {
        let url = self
            .endpoint("v1/usage-metrics")
            .map_err(|e| ExportError::Transport(e.to_string()))?;

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.usage_payload(snapshot))
            .send()
            .await
            .map_err(|e| ExportError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Decode a decisions response; the API answers `null` when there are none.
pub fn parse_decisions(body: &[u8]) -> DecisionResult<Vec<Decision>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let decisions: Option<Vec<Decision>> =
        serde_json::from_slice(body).map_err(|e| DecisionError::Protocol(e.to_string()))?;
    Ok(decisions.unwrap_or_default())
}

const UNKNOWN_OS_VERSION: &str = "unknown";

/// Distribution version from `/etc/os-release`, or "unknown".
fn os_version() -> String {
    std::fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| parse_os_release_version(&content))
        .unwrap_or_else(|| UNKNOWN_OS_VERSION.to_string())
}

fn parse_os_release_version(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix("VERSION_ID="))
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Debug, Serialize)]
struct UsageMetrics<'a> {
    remediation_components: Vec<RemediationComponent<'a>>,
}

#[derive(Debug, Serialize)]
struct RemediationComponent<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    version: &'static str,
    utc_startup_timestamp: u64,
    os: OsInfo<'a>,
    feature_flags: Vec<String>,
    metrics: Vec<DetailedMetrics<'a>>,
}

#[derive(Debug, Serialize)]
struct OsInfo<'a> {
    name: &'static str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct DetailedMetrics<'a> {
    meta: MetricsMeta,
    items: Vec<UsageItem<'a>>,
}

#[derive(Debug, Serialize)]
struct MetricsMeta {
    window_size_seconds: u64,
    utc_now_timestamp: u64,
}

#[derive(Debug, Serialize)]
struct UsageItem<'a> {
    name: &'static str,
    value: u64,
    unit: &'static str,
    labels: BTreeMap<&'static str, &'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::{MetricItem, MetricKind};

    fn config(url: &str, key: &str) -> CrowdsecConfig {
        CrowdsecConfig {
            api_key: key.to_string(),
            agent_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(
            LapiClient::new(&config("http://127.0.0.1:8080", "")),
            Err(DecisionError::InvalidConfig(_))
        ));
        assert!(matches!(
            LapiClient::new(&config("not a url", "key")),
            Err(DecisionError::InvalidConfig(_))
        ));
        assert!(matches!(
            LapiClient::new(&config("ftp://127.0.0.1", "key")),
            Err(DecisionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = LapiClient::new(&config("http://127.0.0.1:8080/crowdsec", "key")).unwrap();
        assert_eq!(
            client.endpoint("v1/decisions").unwrap().as_str(),
            "http://127.0.0.1:8080/crowdsec/v1/decisions"
        );

        let client = LapiClient::new(&config("http://127.0.0.1:8080/", "key")).unwrap();
        assert_eq!(
            client.endpoint("v1/usage-metrics").unwrap().as_str(),
            "http://127.0.0.1:8080/v1/usage-metrics"
        );
    }

    #[test]
    fn test_parse_decisions() {
        assert!(parse_decisions(b"null").unwrap().is_empty());
        assert!(parse_decisions(b"").unwrap().is_empty());
        assert!(parse_decisions(b"[]").unwrap().is_empty());

        let body = br#"[{"type":"ban","value":"203.0.113.5","scope":"Ip","scenario":"manual","duration":"4h","origin":"cscli"}]"#;
        let decisions = parse_decisions(body).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].value, "203.0.113.5");

        assert!(matches!(
            parse_decisions(b"{\"message\":"),
            Err(DecisionError::Protocol(_))
        ));
    }

    #[test]
    fn test_usage_payload_shape() {
        let client = LapiClient::new(&config("http://127.0.0.1:8080", "key")).unwrap();
        let snapshot = MetricSnapshot {
            timestamp: 1_700_000_000,
            window: Duration::from_secs(900),
            items: vec![
                MetricItem {
                    kind: MetricKind::Processed,
                    origin: "example.com".into(),
                    value: 12,
                },
                MetricItem {
                    kind: MetricKind::Blocked,
                    origin: "example.com".into(),
                    value: 3,
                },
            ],
        };

        let json = serde_json::to_value(client.usage_payload(&snapshot)).unwrap();
        let component = &json["remediation_components"][0];
        assert_eq!(component["type"], BOUNCER_TYPE);
        assert_eq!(component["metrics"][0]["meta"]["window_size_seconds"], 900);
        assert_eq!(component["metrics"][0]["meta"]["utc_now_timestamp"], 1_700_000_000u64);

        let items = component["metrics"][0]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "processed");
        assert_eq!(items[0]["value"], 12);
        assert_eq!(items[1]["name"], "dropped");
        assert_eq!(items[1]["labels"]["origin"], "example.com");
        assert_eq!(items[1]["unit"], "request");

        assert_eq!(component["os"]["name"], std::env::consts::OS);
        assert_eq!(component["os"]["version"], client.os_version.as_str());
    }

    #[test]
    fn test_os_release_version() {
        let content = "NAME=\"Debian GNU/Linux\"\nVERSION_ID=\"12\"\nID=debian\n";
        assert_eq!(parse_os_release_version(content), Some("12".to_string()));
        assert_eq!(parse_os_release_version("VERSION_ID=3.19.1\n"), Some("3.19.1".to_string()));
        assert_eq!(parse_os_release_version("NAME=Arch Linux\nID=arch\n"), None);
        assert_eq!(parse_os_release_version("VERSION_ID=\"\"\n"), None);
    }

    #[test]
    fn test_os_version_is_not_the_architecture() {
        let version = os_version();
        assert!(!version.is_empty());
        assert_ne!(version, std::env::consts::ARCH);
    }
}
