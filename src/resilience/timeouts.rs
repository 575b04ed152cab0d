//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound each decision query by a deadline fixed when evaluation starts
//! - Abandon the query future once the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A missed deadline is reported as a decision source error, so callers
//!   handle it on the same fail-open path as transport failures

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::decisions::{DecisionError, DecisionResult};

/// Ceiling for one request evaluation.
pub const EVALUATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `query` until `deadline`, mapping expiry to [`DecisionError::Timeout`].
///
/// `budget` is only used to describe the timeout in the error.
pub async fn query_with_deadline<T, F>(
    deadline: Instant,
    budget: Duration,
    query: F,
) -> DecisionResult<T>
where
    F: Future<Output = DecisionResult<T>>,
{
    match timeout_at(deadline, query).await {
        Ok(result) => result,
        Err(_) => Err(DecisionError::Timeout(budget)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_before_deadline() {
        let deadline = Instant::now() + Duration::from_secs(1);
        let result = query_with_deadline(deadline, Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_expired_deadline_times_out() {
        let budget = Duration::from_millis(20);
        let deadline = Instant::now() + budget;
        let result: DecisionResult<()> = query_with_deadline(deadline, budget, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(DecisionError::Timeout(d)) if d == budget));
    }
}
