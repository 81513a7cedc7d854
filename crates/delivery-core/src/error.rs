//! # Storage Errors
//!
//! This module defines the error contract shared by every store implementation.
//! Centralizing the definitions keeps error handling consistent across the
//! engine, the hub, and any store backend plugged in behind the traits.

/// Errors that a store operation can surface.
///
/// Only [`StoreError::Unavailable`] is considered transient and eligible for
/// retry (see [`crate::retry`]). The other variants are terminal for the call
/// that produced them: the record either does not exist or is already claimed,
/// and repeating the request cannot change that.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// No record exists under the requested key.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A conditional write lost to a value already in place. Carries the id
    /// of the current holder so callers can report who won.
    #[error("record already claimed by {0}")]
    Conflict(String),

    /// The backend could not serve the request right now (timeout, lost
    /// connection). Retryable with backoff.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
