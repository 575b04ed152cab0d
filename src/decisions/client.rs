//! Decision source abstraction.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::decisions::types::{Decision, DecisionResult};

/// Anything that can tell whether an address currently has decisions.
///
/// Implementations must be safe to query from many evaluations at once.
#[async_trait]
pub trait DecisionSource: Send + Sync {
    /// Active decisions for `ip`; an empty list means no decision.
    async fn query(&self, ip: IpAddr) -> DecisionResult<Vec<Decision>>;
}
