//! Client identity resolution.
//!
//! Picks the address a request really came from, in trust order:
//!
//! ```text
//! X-Real-IP         (exact key only)
//!   → CF-Connecting-IP  (case-insensitive only when behind the edge CDN)
//!   → X-Forwarded-For   (case-insensitive, leftmost entry)
//!   → connection remote address
//! ```
//!
//! The first source yielding a non-empty candidate wins. The candidate then
//! has any `:port` suffix stripped and must parse as an IPv4 or IPv6 address.

use std::net::IpAddr;

use thiserror::Error;

use crate::bouncer::RequestContext;
use crate::security::headers::{self, HeaderLookup};

pub const X_REAL_IP: &str = "X-Real-IP";
pub const CF_CONNECTING_IP: &str = "CF-Connecting-IP";
pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";

/// Why no client address could be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// No header or connection address produced a candidate.
    #[error("no valid IP address found in headers or remote address")]
    NoValidAddress,

    /// A candidate was found but is not an IP address.
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),
}

/// Resolve the client address for one request.
pub fn resolve_client_ip(ctx: &RequestContext) -> Result<IpAddr, IdentityError> {
    let candidate = select_candidate(ctx).ok_or(IdentityError::NoValidAddress)?;
    parse_candidate(&candidate)
}

fn select_candidate(ctx: &RequestContext) -> Option<String> {
    let headers = &ctx.headers;

    // Rarely set, so absence is not worth logging.
    if let HeaderLookup::Found(ip) = headers::resolve(headers, X_REAL_IP, false) {
        return Some(ip);
    }

    match headers::resolve(headers, CF_CONNECTING_IP, ctx.proxied_behind_edge_cdn) {
        HeaderLookup::Found(ip) => return Some(ip),
        HeaderLookup::Empty => {
            tracing::debug!(
                request_id = %ctx.request_id,
                "CF-Connecting-IP present but empty"
            );
        }
        HeaderLookup::Missing if ctx.proxied_behind_edge_cdn => {
            tracing::debug!(
                request_id = %ctx.request_id,
                "CF-Connecting-IP missing while proxied behind edge CDN"
            );
        }
        HeaderLookup::Missing => {}
    }

    match headers::resolve(headers, X_FORWARDED_FOR, true) {
        HeaderLookup::Found(chain) => {
            let first = chain.split(',').next().map(str::trim).unwrap_or_default();
            if !first.is_empty() {
                return Some(first.to_string());
            }
            tracing::debug!(
                request_id = %ctx.request_id,
                chain = %chain,
                "X-Forwarded-For has an empty leading entry"
            );
        }
        HeaderLookup::Empty => {
            tracing::debug!(
                request_id = %ctx.request_id,
                "X-Forwarded-For present but empty"
            );
        }
        HeaderLookup::Missing => {
            tracing::debug!(request_id = %ctx.request_id, "X-Forwarded-For missing");
        }
    }

    let remote = ctx.remote_addr.trim();
    if remote.is_empty() {
        return None;
    }
    tracing::debug!(
        request_id = %ctx.request_id,
        remote_addr = %remote,
        "Falling back to remote address"
    );
    Some(remote.to_string())
}

fn parse_candidate(candidate: &str) -> Result<IpAddr, IdentityError> {
    let trimmed = candidate.trim();
    let host = split_host_port(trimmed).unwrap_or(trimmed);

    host.parse::<IpAddr>()
        .map_err(|_| IdentityError::InvalidAddress(host.to_string()))
}

/// Split `host:port` or `[host]:port`, returning the host.
///
/// Returns `None` when there is no port to split off, including bare IPv6
/// literals with several colons.
fn split_host_port(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let end = rest.find(']')?;
        let host = &rest[..end];
        let port = rest[end + 1..].strip_prefix(':')?;
        if port.contains(':') || host.contains('[') {
            return None;
        }
        return Some(host);
    }

    let (host, _port) = addr.rsplit_once(':')?;
    if host.contains(':') || host.contains('[') || host.contains(']') {
        return None;
    }
    Some(host)
}
