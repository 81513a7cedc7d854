//! In-memory store implementations.
//!
//! Both stores keep their records in a [`KeyedTable`], which provides the
//! per-key atomic read-modify-write the [`OrderStore`] contract requires.
//! They are the production wiring for single-process deployments and the
//! substrate the fault-injecting test stores wrap.

use crate::model::{
    GeoPoint, Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, RiderId, RiderLocation,
};
use crate::store::{LocationStore, OrderFilter, OrderStore};
use async_trait::async_trait;
use chrono::Utc;
use delivery_core::{KeyedTable, StoreError};
use std::sync::atomic::{AtomicU32, Ordering};

/// Order storage backed by a concurrent keyed table.
///
/// Ids are assigned from a monotonically increasing counter, so newer orders
/// always carry larger ids; `find` uses that as the tie-breaker when two
/// orders share a creation timestamp.
pub struct MemoryOrderStore {
    orders: KeyedTable<OrderId, Order>,
    next_id: AtomicU32,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self {
            orders: KeyedTable::new(),
            next_id: AtomicU32::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, params: OrderCreate) -> Result<Order, StoreError> {
        let id = OrderId::from(self.next_id.fetch_add(1, Ordering::SeqCst));
        let order = Order::create(id, params, Utc::now());
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.orders
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let mut orders = self.orders.scan(|order| filter.matches(order));
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    async fn compare_and_set_rider_id(
        &self,
        id: &OrderId,
        rider: &RiderId,
    ) -> Result<Order, StoreError> {
        self.orders
            .modify(id, |order| {
                if let Some(current) = &order.rider_id {
                    if current != rider {
                        return Err(StoreError::Conflict(current.to_string()));
                    }
                }
                order.rider_id = Some(rider.clone());
                // Only a fresh order jumps straight to accepted; a kitchen
                // already preparing keeps its status.
                if order.status == OrderStatus::Pending {
                    order.status = OrderStatus::Accepted;
                }
                order.updated_at = Utc::now();
                Ok(order.clone())
            })
            .unwrap_or_else(|| Err(StoreError::NotFound(id.to_string())))
    }

    async fn update_fields(&self, id: &OrderId, update: OrderUpdate) -> Result<Order, StoreError> {
        self.orders
            .modify(id, |order| {
                if let Some(status) = update.status {
                    order.status = status;
                }
                if let Some(link) = update.live_tracking_link.clone() {
                    order.live_tracking_link = Some(link);
                }
                order.updated_at = Utc::now();
                Ok(order.clone())
            })
            .unwrap_or_else(|| Err(StoreError::NotFound(id.to_string())))
    }
}

/// Location storage: one live record per rider, replace on every report.
pub struct MemoryLocationStore {
    locations: KeyedTable<RiderId, RiderLocation>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self {
            locations: KeyedTable::new(),
        }
    }
}

impl Default for MemoryLocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn upsert(&self, mut location: RiderLocation) -> Result<(), StoreError> {
        location.timestamp = Utc::now();
        self.locations.insert(location.rider_id.clone(), location);
        Ok(())
    }

    async fn get(&self, rider: &RiderId) -> Result<Option<RiderLocation>, StoreError> {
        Ok(self.locations.get(rider))
    }

    async fn nearest(
        &self,
        origin: GeoPoint,
        limit: usize,
    ) -> Result<Vec<RiderLocation>, StoreError> {
        let mut locations = self.locations.scan(|_| true);
        locations.sort_by(|a, b| {
            origin
                .haversine_km(&a.position)
                .total_cmp(&origin.haversine_km(&b.position))
        });
        locations.truncate(limit);
        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeliveryAddress, OrderItem, PaymentMethod};
    use chrono::Utc;

    fn create_params(customer: &str, restaurant: &str) -> OrderCreate {
        OrderCreate {
            customer_id: customer.into(),
            restaurant_id: restaurant.into(),
            items: vec![OrderItem {
                item_id: "i1".into(),
                name: "Noodles".into(),
                qty: 1,
                price: 8.5,
            }],
            delivery_address: DeliveryAddress {
                latitude: 1.0,
                longitude: 2.0,
                address_text: "Home".into(),
            },
            total_amount: Some(8.5),
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }

    fn sample(rider: &str, lng: f64, lat: f64) -> RiderLocation {
        RiderLocation {
            rider_id: rider.into(),
            order_id: None,
            position: GeoPoint {
                longitude: lng,
                latitude: lat,
            },
            heading: 0.0,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = MemoryOrderStore::new();
        let first = store.create(create_params("c", "r")).await.unwrap();
        let second = store.create(create_params("c", "r")).await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn cas_rejects_second_rider_and_keeps_first() {
        let store = MemoryOrderStore::new();
        let order = store.create(create_params("c", "r")).await.unwrap();

        let won = store
            .compare_and_set_rider_id(&order.id, &"rider_1".into())
            .await
            .unwrap();
        assert_eq!(won.rider_id, Some("rider_1".into()));
        assert_eq!(won.status, OrderStatus::Accepted);

        let lost = store
            .compare_and_set_rider_id(&order.id, &"rider_2".into())
            .await;
        assert_eq!(lost, Err(StoreError::Conflict("rider_1".into())));

        let current = store.get_by_id(&order.id).await.unwrap();
        assert_eq!(current.rider_id, Some("rider_1".into()));
    }

    #[tokio::test]
    async fn cas_is_idempotent_for_the_same_rider() {
        let store = MemoryOrderStore::new();
        let order = store.create(create_params("c", "r")).await.unwrap();

        store
            .compare_and_set_rider_id(&order.id, &"rider_1".into())
            .await
            .unwrap();
        let again = store
            .compare_and_set_rider_id(&order.id, &"rider_1".into())
            .await
            .unwrap();
        assert_eq!(again.rider_id, Some("rider_1".into()));
    }

    #[tokio::test]
    async fn cas_preserves_non_pending_status() {
        let store = MemoryOrderStore::new();
        let order = store.create(create_params("c", "r")).await.unwrap();
        store
            .update_fields(
                &order.id,
                OrderUpdate {
                    status: Some(OrderStatus::Ready),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let claimed = store
            .compare_and_set_rider_id(&order.id, &"rider_1".into())
            .await
            .unwrap();
        assert_eq!(claimed.status, OrderStatus::Ready);
    }

    #[tokio::test]
    async fn find_filters_and_sorts_newest_first() {
        let store = MemoryOrderStore::new();
        let a = store.create(create_params("c1", "r1")).await.unwrap();
        let b = store.create(create_params("c2", "r1")).await.unwrap();
        let _other = store.create(create_params("c1", "r2")).await.unwrap();

        let filter = OrderFilter {
            restaurant_id: Some("r1".into()),
            ..Default::default()
        };
        let found = store.find(&filter).await.unwrap();
        let ids: Vec<_> = found.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn upsert_replaces_previous_report() {
        let store = MemoryLocationStore::new();
        store.upsert(sample("rider_1", 10.0, 50.0)).await.unwrap();
        store.upsert(sample("rider_1", 11.0, 51.0)).await.unwrap();

        let current = store.get(&"rider_1".into()).await.unwrap().unwrap();
        assert_eq!(current.position.longitude, 11.0);
        assert_eq!(current.position.latitude, 51.0);
    }

    #[tokio::test]
    async fn nearest_orders_by_distance() {
        let store = MemoryLocationStore::new();
        store.upsert(sample("far", 20.0, 20.0)).await.unwrap();
        store.upsert(sample("near", 0.1, 0.1)).await.unwrap();
        store.upsert(sample("mid", 5.0, 5.0)).await.unwrap();

        let origin = GeoPoint {
            longitude: 0.0,
            latitude: 0.0,
        };
        let ranked = store.nearest(origin, 2).await.unwrap();
        let ids: Vec<_> = ranked.iter().map(|l| l.rider_id.0.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
    }
}
