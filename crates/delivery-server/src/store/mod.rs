//! # Store Contracts
//!
//! The engine and hub talk to storage exclusively through the traits in this
//! module. Implementations promise per-key atomic read-modify-write; beyond
//! that, the backing technology is their business. The in-memory
//! implementations in [`memory`] are the ones wired by default;
//! [`mock`] provides fault-injecting wrappers for tests.

pub mod memory;
pub mod mock;

pub use memory::{MemoryLocationStore, MemoryOrderStore};
pub use mock::{FlakyLocationStore, FlakyOrderStore};

use crate::model::{
    CustomerId, GeoPoint, Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, RestaurantId,
    RiderId, RiderLocation,
};
use async_trait::async_trait;
use delivery_core::StoreError;

/// Predicate over orders for secondary lookups.
///
/// All populated fields must match. `find` results are always returned
/// newest-first by creation time.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub restaurant_id: Option<RestaurantId>,
    pub customer_id: Option<CustomerId>,
    pub rider_id: Option<RiderId>,
    /// Match only orders with no rider bound.
    pub unassigned_only: bool,
    pub status_in: Option<Vec<OrderStatus>>,
    pub status_not_in: Option<Vec<OrderStatus>>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(restaurant_id) = &self.restaurant_id {
            if &order.restaurant_id != restaurant_id {
                return false;
            }
        }
        if let Some(customer_id) = &self.customer_id {
            if &order.customer_id != customer_id {
                return false;
            }
        }
        if let Some(rider_id) = &self.rider_id {
            if order.rider_id.as_ref() != Some(rider_id) {
                return false;
            }
        }
        if self.unassigned_only && order.rider_id.is_some() {
            return false;
        }
        if let Some(included) = &self.status_in {
            if !included.contains(&order.status) {
                return false;
            }
        }
        if let Some(excluded) = &self.status_not_in {
            if excluded.contains(&order.status) {
                return false;
            }
        }
        true
    }
}

/// Durable keyed storage of [`Order`] entities.
///
/// The store is the sole writer of order ids and timestamps. The lifecycle
/// engine is its only caller; nothing else mutates order state.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order with a fresh id, `pending` status, no rider, and
    /// store-assigned timestamps. The payload is assumed validated.
    async fn create(&self, params: OrderCreate) -> Result<Order, StoreError>;

    /// Loads one order.
    async fn get_by_id(&self, id: &OrderId) -> Result<Order, StoreError>;

    /// Returns all orders matching `filter`, newest-first by creation time.
    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;

    /// Atomically binds `rider` to the order: the check of the current
    /// rider, the bind, and the `pending → accepted` advance happen under
    /// one per-record critical section.
    ///
    /// Fails with [`StoreError::Conflict`] (carrying the holder's id) when a
    /// different rider is already bound. Re-binding the same rider is a
    /// no-op that succeeds. A `preparing` or `ready` status is left alone so
    /// restaurant-side progress survives the claim.
    async fn compare_and_set_rider_id(
        &self,
        id: &OrderId,
        rider: &RiderId,
    ) -> Result<Order, StoreError>;

    /// Applies `update` to the order and refreshes `updated_at`.
    async fn update_fields(&self, id: &OrderId, update: OrderUpdate) -> Result<Order, StoreError>;
}

/// Durable keyed storage of the latest [`RiderLocation`] per rider.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Replaces the rider's live record, stamping the timestamp. First
    /// report inserts, every later report overwrites.
    async fn upsert(&self, location: RiderLocation) -> Result<(), StoreError>;

    /// Current position of one rider, if any was ever reported.
    async fn get(&self, rider: &RiderId) -> Result<Option<RiderLocation>, StoreError>;

    /// Up to `limit` rider locations closest to `origin`, nearest first.
    /// Continuity feature for dispatch tooling; the broadcast path never
    /// calls it.
    async fn nearest(&self, origin: GeoPoint, limit: usize)
        -> Result<Vec<RiderLocation>, StoreError>;
}
