//! Responses returned to the host.
//!
//! # Design Decisions
//! - Sniff answers use the host's status vocabulary: 200 accepts the request
//!   into the capture stage, 501 skips it
//! - Blocked clients only ever see a fixed 403; no decision metadata leaks

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::bouncer::Verdict;

pub const FORBIDDEN_BODY: &str = "Forbidden";

/// Answer to a sniff request.
pub fn sniff_response(verdict: Verdict) -> Response {
    match verdict {
        Verdict::Accept => (StatusCode::OK, "OK").into_response(),
        Verdict::Skip => (StatusCode::NOT_IMPLEMENTED, "SKIP").into_response(),
    }
}

/// Terminal response for a captured (blocked) request.
pub fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "text/plain")],
        FORBIDDEN_BODY,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_statuses() {
        assert_eq!(sniff_response(Verdict::Accept).status(), StatusCode::OK);
        assert_eq!(sniff_response(Verdict::Skip).status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_forbidden() {
        let res = forbidden();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/plain");
    }
}
