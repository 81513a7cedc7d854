//! # Bounded Retry with Backoff
//!
//! [`retry`] re-runs a store operation when it fails with the one transient
//! error class, [`StoreError::Unavailable`], sleeping between attempts with
//! exponential backoff. Every other error is returned to the caller on the
//! first occurrence: validation, missing records, and lost claims are facts,
//! not weather.
//!
//! The delay for attempt `n` is `first_delay × 2^n`, clamped to `max_delay`.

use crate::error::StoreError;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Controls how many times a transient store failure is retried and how the
/// delay between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the initial attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub first_delay: Duration,
    /// Cap on the delay between attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            first_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay for the given retry attempt (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.first_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Total attempts this policy allows, counting the initial one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Runs `op`, retrying on [`StoreError::Unavailable`] according to `policy`.
///
/// `what` names the operation in retry logs. The last `Unavailable` error is
/// returned once the budget is exhausted.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(StoreError::Unavailable(reason)) if attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(what, attempt, ?delay, %reason, "store unavailable, retrying");
                sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            first_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn delay_doubles_up_to_cap() {
        let policy = RetryPolicy {
            max_retries: 10,
            first_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(50),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(10));
        assert_eq!(policy.delay_for(1), Duration::from_millis(20));
        assert_eq!(policy.delay_for(2), Duration::from_millis(40));
        assert_eq!(policy.delay_for(3), Duration::from_millis(50));
        assert_eq!(policy.delay_for(100), Duration::from_millis(50));
    }

    #[tokio::test]
    async fn recovers_within_budget() {
        let calls = AtomicU32::new(0);
        let out = retry(&fast_policy(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(StoreError::Unavailable("flaky".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(out, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_unavailable_after_exhaustion() {
        let calls = AtomicU32::new(0);
        let out: Result<(), _> = retry(&fast_policy(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::Unavailable("down".into())) }
        })
        .await;
        assert_eq!(out, Err(StoreError::Unavailable("down".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let out: Result<(), _> = retry(&fast_policy(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StoreError::NotFound("order_9".into())) }
        })
        .await;
        assert_eq!(out, Err(StoreError::NotFound("order_9".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
