//! # Delivery Core
//!
//! This crate provides the domain-agnostic building blocks for the delivery
//! backend: concurrent keyed state, keyed publish/subscribe fan-out, and
//! bounded retry for transient storage failures.
//!
//! ## Architecture Overview
//!
//! The crate separates three concerns that every stateful service ends up
//! needing:
//!
//! 1. **State** ([`KeyedTable`]) - a sharded concurrent map whose
//!    [`modify`](KeyedTable::modify) method gives per-key atomic
//!    read-modify-write. Records under different keys never contend on a
//!    common lock, which is what lets many independent resources mutate in
//!    parallel while a single record's conditional updates stay race-free.
//! 2. **Fan-out** ([`TopicHub`]) - a registry of subscribers keyed by topic,
//!    with one bounded queue per subscriber and non-blocking publish. A slow
//!    or dead consumer affects only itself.
//! 3. **Resilience** ([`retry`](retry::retry) + [`RetryPolicy`]) - bounded
//!    exponential backoff applied to exactly one error class,
//!    [`StoreError::Unavailable`]. Terminal errors pass through untouched.
//!
//! The domain crate composes these: its stores are `KeyedTable`s behind
//! async traits, its live-location channel is a `TopicHub`, and its engine
//! wraps store calls in `retry`.
//!
//! ## Concurrency Model
//!
//! - No global locks: both the table and the hub shard their state.
//! - Writers hold an entry guard only for the duration of one update closure.
//! - Publishing never awaits a subscriber; delivery is `try_send` or drop.

pub mod error;
pub mod hub;
pub mod retry;
pub mod table;
pub mod tracing;

// Re-export core types for convenience
pub use error::StoreError;
pub use hub::TopicHub;
pub use retry::RetryPolicy;
pub use table::KeyedTable;
