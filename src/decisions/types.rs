//! Decision records and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decision type that marks an outright ban.
pub const BAN: &str = "ban";

/// A remediation decision returned by the Local API.
///
/// Only presence matters for the verdict; the fields are carried for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decision {
    pub id: Option<i64>,
    /// Source of the decision (e.g. "crowdsec", "cscli", "CAPI").
    pub origin: String,
    /// Remediation type, usually "ban" or "captcha".
    #[serde(rename = "type")]
    pub kind: String,
    /// Scope of `value` ("Ip", "Range", ...).
    pub scope: String,
    /// The subject the decision applies to.
    pub value: String,
    /// Remaining duration as reported by the API (e.g. "3h59m12s").
    pub duration: String,
    pub scenario: String,
    pub until: Option<String>,
}

impl Decision {
    pub fn is_ban(&self) -> bool {
        self.kind == BAN
    }
}

/// Pick the decision to attribute a block to: the first ban, if any.
pub fn representative(decisions: &[Decision]) -> Option<&Decision> {
    decisions.iter().find(|d| d.is_ban())
}

/// Errors that can occur while talking to the decision source.
#[derive(Debug, Error)]
pub enum DecisionError {
    /// Connection or request failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Query did not finish before the deadline.
    #[error("decision query timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Non-success HTTP status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Client could not be constructed from configuration.
    #[error("invalid decision source configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for decision source operations.
pub type DecisionResult<T> = Result<T, DecisionError>;
