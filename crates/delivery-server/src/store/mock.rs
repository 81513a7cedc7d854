//! # Fault-Injecting Stores
//!
//! Wrappers around the in-memory stores that fail the next N calls with
//! [`StoreError::Unavailable`] before delegating normally. They exist so
//! tests can exercise the paths that are otherwise unreachable with a
//! healthy backend: the engine's retry-then-surface behavior and the hub's
//! log-and-broadcast-anyway policy.
//!
//! Error injection through a real store beats mocking the whole trait here:
//! after the injected failures drain, the wrapped store still behaves like
//! the production one, so a recovery test observes genuine end state.

use crate::model::{
    GeoPoint, Order, OrderCreate, OrderId, OrderUpdate, RiderId, RiderLocation,
};
use crate::store::{
    LocationStore, MemoryLocationStore, MemoryOrderStore, OrderFilter, OrderStore,
};
use async_trait::async_trait;
use delivery_core::StoreError;
use std::sync::atomic::{AtomicU32, Ordering};

fn take_failure(budget: &AtomicU32) -> Result<(), StoreError> {
    let injected = budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if injected {
        Err(StoreError::Unavailable("injected outage".into()))
    } else {
        Ok(())
    }
}

/// An [`OrderStore`] that fails on demand.
pub struct FlakyOrderStore {
    inner: MemoryOrderStore,
    failures: AtomicU32,
}

impl FlakyOrderStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryOrderStore::new(),
            failures: AtomicU32::new(0),
        }
    }

    /// Makes the next `n` store calls fail with `Unavailable`.
    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }
}

impl Default for FlakyOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for FlakyOrderStore {
    async fn create(&self, params: OrderCreate) -> Result<Order, StoreError> {
        take_failure(&self.failures)?;
        self.inner.create(params).await
    }

    async fn get_by_id(&self, id: &OrderId) -> Result<Order, StoreError> {
        take_failure(&self.failures)?;
        self.inner.get_by_id(id).await
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        take_failure(&self.failures)?;
        self.inner.find(filter).await
    }

    async fn compare_and_set_rider_id(
        &self,
        id: &OrderId,
        rider: &RiderId,
    ) -> Result<Order, StoreError> {
        take_failure(&self.failures)?;
        self.inner.compare_and_set_rider_id(id, rider).await
    }

    async fn update_fields(&self, id: &OrderId, update: OrderUpdate) -> Result<Order, StoreError> {
        take_failure(&self.failures)?;
        self.inner.update_fields(id, update).await
    }
}

/// A [`LocationStore`] that fails on demand.
pub struct FlakyLocationStore {
    inner: MemoryLocationStore,
    failures: AtomicU32,
}

impl FlakyLocationStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryLocationStore::new(),
            failures: AtomicU32::new(0),
        }
    }

    /// Makes the next `n` store calls fail with `Unavailable`.
    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }
}

impl Default for FlakyLocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationStore for FlakyLocationStore {
    async fn upsert(&self, location: RiderLocation) -> Result<(), StoreError> {
        take_failure(&self.failures)?;
        self.inner.upsert(location).await
    }

    async fn get(&self, rider: &RiderId) -> Result<Option<RiderLocation>, StoreError> {
        take_failure(&self.failures)?;
        self.inner.get(rider).await
    }

    async fn nearest(
        &self,
        origin: GeoPoint,
        limit: usize,
    ) -> Result<Vec<RiderLocation>, StoreError> {
        take_failure(&self.failures)?;
        self.inner.nearest(origin, limit).await
    }
}
