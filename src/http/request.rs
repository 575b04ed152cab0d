//! Sniff request decoding.
//!
//! # Responsibilities
//! - Decode the host's JSON description of an inbound request
//! - Tolerate missing fields and `null` header values
//! - Build the per-request evaluation context

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::bouncer::RequestContext;
use crate::security::headers::HeaderMap;

/// A request forwarded by the host for a sniff decision.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SniffRequest {
    pub method: String,
    pub hostname: String,
    pub url: String,
    #[serde(deserialize_with = "nullable_headers")]
    pub header: HeaderMap,
    pub remote_addr: String,
    pub host: String,
    pub request_uri: String,
    pub proto: String,
    pub request_uuid: String,
}

impl SniffRequest {
    /// Origin label for metrics: the hostname, else the Host header value.
    pub fn origin(&self) -> &str {
        if self.hostname.trim().is_empty() {
            &self.host
        } else {
            &self.hostname
        }
    }

    pub fn into_context(self, proxied_behind_edge_cdn: bool) -> RequestContext {
        let request_id = if self.request_uuid.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            self.request_uuid.clone()
        };
        let origin = self.origin().to_string();

        RequestContext::new(self.remote_addr, self.header, proxied_behind_edge_cdn)
            .with_origin(origin)
            .with_request_uri(self.request_uri)
            .with_request_id(request_id)
    }
}

fn nullable_headers<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Option<Vec<String>>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, values)| (name, values.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_payload() {
        let json = r#"{
            "method": "GET",
            "hostname": "example.com",
            "url": "/login",
            "header": {"X-Real-IP": ["203.0.113.5"], "Accept": ["*/*"]},
            "remote_addr": "192.168.1.100:51234",
            "host": "example.com",
            "request_uri": "/login?next=/",
            "proto": "HTTP/1.1",
            "request_uuid": "6f1c1f5e-0000-4000-8000-000000000001"
        }"#;
        let req: SniffRequest = serde_json::from_str(json).unwrap();
        let ctx = req.into_context(true);

        assert_eq!(ctx.origin, "example.com");
        assert_eq!(ctx.remote_addr, "192.168.1.100:51234");
        assert_eq!(ctx.request_uri, "/login?next=/");
        assert_eq!(ctx.request_id, "6f1c1f5e-0000-4000-8000-000000000001");
        assert_eq!(ctx.headers["X-Real-IP"], vec!["203.0.113.5".to_string()]);
        assert!(ctx.proxied_behind_edge_cdn);
    }

    #[test]
    fn test_null_headers_are_empty() {
        let json = r#"{"header": {"X-Real-IP": null, "CF-Connecting-IP": ["203.0.113.10"]}}"#;
        let req: SniffRequest = serde_json::from_str(json).unwrap();
        assert!(req.header["X-Real-IP"].is_empty());

        let req: SniffRequest = serde_json::from_str(r#"{"header": null}"#).unwrap();
        assert!(req.header.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let req: SniffRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.origin(), "");
        let ctx = req.into_context(false);
        assert!(!ctx.request_id.is_empty());
    }

    #[test]
    fn test_origin_falls_back_to_host() {
        let req = SniffRequest {
            host: "example.org".into(),
            ..Default::default()
        };
        assert_eq!(req.origin(), "example.org");
    }
}
