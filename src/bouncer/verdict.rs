//! Verdict and per-request context.

use uuid::Uuid;

use crate::security::headers::HeaderMap;

/// Outcome of evaluating one request.
///
/// Named in the host's vocabulary: `Accept` pulls the request into this
/// plugin's capture stage, where it is blocked; `Skip` hands it back to the
/// proxy for normal handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Block: the capture handler answers the request.
    Accept,
    /// Allow: the proxy continues as usual.
    Skip,
}

/// Everything the evaluator needs about one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Connection address, `host:port` or bare host. May be empty.
    pub remote_addr: String,
    pub headers: HeaderMap,
    /// Trust the CDN header under any casing.
    pub proxied_behind_edge_cdn: bool,
    /// Hostname the request was addressed to; used as the metric label.
    pub origin: String,
    pub request_uri: String,
    pub request_id: String,
}

impl RequestContext {
    pub fn new(remote_addr: impl Into<String>, headers: HeaderMap, proxied_behind_edge_cdn: bool) -> Self {
        Self {
            remote_addr: remote_addr.into(),
            headers,
            proxied_behind_edge_cdn,
            origin: String::new(),
            request_uri: String::new(),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_request_uri(mut self, uri: impl Into<String>) -> Self {
        self.request_uri = uri.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = id.into();
        self
    }
}
