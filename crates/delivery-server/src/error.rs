//! Error types for the delivery domain.

use crate::model::{OrderId, RiderId};
use thiserror::Error;

/// Errors that can occur during order lifecycle operations.
///
/// Every variant is terminal for the call that produced it except
/// [`OrderError::StoreUnavailable`], which is only surfaced after the
/// engine's retry budget is spent. A rider losing a claim should re-query
/// the available list rather than retry the same claim.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The request payload is malformed; the caller must fix it.
    #[error("order validation failed: {0}")]
    Validation(String),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The status value is outside the recognized set.
    #[error("invalid order status: {0}")]
    InvalidStatus(String),

    /// The claim lost: another rider already holds the order.
    #[error("{order_id} already assigned to rider {rider_id}")]
    AlreadyAssigned { order_id: OrderId, rider_id: RiderId },

    /// The order store stayed unavailable through every retry.
    #[error("order store unavailable after {attempts} attempts: {reason}")]
    StoreUnavailable { attempts: u32, reason: String },
}

/// Errors that can occur when publishing a rider location sample.
///
/// Persistence failures are deliberately absent: the hub logs them and
/// broadcasts anyway, trading durability of one sample for liveness of the
/// tracking channel.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    /// The sample carries out-of-range coordinates or heading.
    #[error("location sample rejected: {0}")]
    Validation(String),
}
