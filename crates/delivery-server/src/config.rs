//! Runtime tunables for the delivery system.

use delivery_core::RetryPolicy;
use serde::Deserialize;

/// Construction-time configuration for [`DeliverySystem`](crate::system::DeliverySystem).
///
/// Every field has a sensible default; deployments override selectively
/// through whatever settles their config (env, file, flags - out of scope
/// here).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Undelivered location updates buffered per subscriber session before
    /// samples start dropping for that session.
    pub hub_queue_capacity: usize,
    /// Retry budget for transient order-store failures.
    pub retry: RetryPolicy,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            hub_queue_capacity: 32,
            retry: RetryPolicy::default(),
        }
    }
}
