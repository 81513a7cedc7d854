//! # Order Lifecycle Engine
//!
//! The engine owns every mutation of order state: creation, status updates,
//! and rider claims. It validates before it writes, maps storage errors into
//! the domain vocabulary, and retries transient store failures with bounded
//! backoff. It is the only caller of the [`OrderStore`].
//!
//! # Architecture Note
//! Arbitration lives in the store's compare-and-set, not here: the engine
//! decides *what* a claim means, the store guarantees the check-bind-advance
//! runs as one atomic step per order. Concurrent claims on different orders
//! never serialize against each other.

use crate::error::OrderError;
use crate::model::{
    CustomerId, Order, OrderCreate, OrderId, OrderStatus, OrderUpdate, RestaurantId, RiderId,
};
use crate::store::{OrderFilter, OrderStore};
use delivery_core::retry::retry;
use delivery_core::{RetryPolicy, StoreError};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Validates and applies order lifecycle operations against an
/// [`OrderStore`].
///
/// Cheap to clone; share one per process.
#[derive(Clone)]
pub struct OrderEngine {
    store: Arc<dyn OrderStore>,
    retry: RetryPolicy,
}

impl OrderEngine {
    pub fn new(store: Arc<dyn OrderStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Creates a new order in `pending` state with no rider bound.
    ///
    /// Validation runs before the store sees the payload; ids and
    /// timestamps are assigned by the store.
    #[instrument(skip(self, params))]
    pub async fn create(&self, params: OrderCreate) -> Result<Order, OrderError> {
        params.validate().map_err(OrderError::Validation)?;
        debug!(?params, "create order");

        let order = retry(&self.retry, "orders.create", || {
            self.store.create(params.clone())
        })
        .await
        .map_err(|e| self.map_store_error(e, None))?;

        info!(order_id = %order.id, restaurant_id = %order.restaurant_id, "order created");
        Ok(order)
    }

    /// Loads a single order.
    #[instrument(skip(self))]
    pub async fn order(&self, id: &OrderId) -> Result<Order, OrderError> {
        retry(&self.retry, "orders.get", || self.store.get_by_id(id))
            .await
            .map_err(|e| self.map_store_error(e, Some(*id)))
    }

    /// Moves the order to `status` and optionally records a tracking link.
    ///
    /// Membership of the status set is the only transition check; see the
    /// note on [`OrderStatus`]. A tracking link is rejected while the order
    /// has no rider - and since a rider, once bound, is never unbound, the
    /// check cannot be raced into a stale read.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        live_tracking_link: Option<String>,
    ) -> Result<Order, OrderError> {
        if live_tracking_link.is_some() {
            let current = self.order(id).await?;
            if current.rider_id.is_none() {
                return Err(OrderError::Validation(
                    "live tracking link requires an assigned rider".into(),
                ));
            }
        }

        let update = OrderUpdate {
            status: Some(status),
            live_tracking_link,
        };
        let order = retry(&self.retry, "orders.update", || {
            self.store.update_fields(id, update.clone())
        })
        .await
        .map_err(|e| self.map_store_error(e, Some(*id)))?;

        info!(order_id = %order.id, status = %order.status, "status updated");
        Ok(order)
    }

    /// Like [`set_status`](Self::set_status), for callers holding the wire
    /// form of the status. An unrecognized name is an invalid-status error.
    pub async fn set_status_by_name(
        &self,
        id: &OrderId,
        status: &str,
        live_tracking_link: Option<String>,
    ) -> Result<Order, OrderError> {
        let status = OrderStatus::from_str(status).map_err(OrderError::InvalidStatus)?;
        self.set_status(id, status, live_tracking_link).await
    }

    /// A rider's claim on an order: at most one rider ever wins.
    ///
    /// The losing rider gets [`OrderError::AlreadyAssigned`] and should
    /// re-query [`available_orders`](Self::available_orders) instead of
    /// retrying. Claiming a `pending` order advances it to `accepted`;
    /// claiming one the kitchen already moved to `preparing` or `ready`
    /// binds the rider without touching the status.
    #[instrument(skip(self))]
    pub async fn accept_order(&self, rider: &RiderId, id: &OrderId) -> Result<Order, OrderError> {
        let order = retry(&self.retry, "orders.claim", || {
            self.store.compare_and_set_rider_id(id, rider)
        })
        .await
        .map_err(|e| self.map_store_error(e, Some(*id)))?;

        info!(order_id = %order.id, rider_id = %rider, status = %order.status, "order claimed");
        Ok(order)
    }

    /// The rider-facing claim queue: unassigned orders still worth claiming,
    /// newest-first.
    #[instrument(skip(self))]
    pub async fn available_orders(&self) -> Result<Vec<Order>, OrderError> {
        self.find(OrderFilter {
            unassigned_only: true,
            status_in: Some(OrderStatus::CLAIMABLE.to_vec()),
            ..Default::default()
        })
        .await
    }

    /// Every order of one restaurant that is not yet delivered,
    /// newest-first. Cancelled and failed orders stay visible so staff see
    /// what fell over.
    #[instrument(skip(self))]
    pub async fn restaurant_active_orders(
        &self,
        restaurant: &RestaurantId,
    ) -> Result<Vec<Order>, OrderError> {
        self.find(OrderFilter {
            restaurant_id: Some(restaurant.clone()),
            status_not_in: Some(vec![OrderStatus::Delivered]),
            ..Default::default()
        })
        .await
    }

    /// All orders in the active set across restaurants, newest-first.
    #[instrument(skip(self))]
    pub async fn all_active_orders(&self) -> Result<Vec<Order>, OrderError> {
        self.find(OrderFilter {
            status_in: Some(OrderStatus::ACTIVE.to_vec()),
            ..Default::default()
        })
        .await
    }

    /// Orders a rider is currently working, newest-first. Terminal orders
    /// drop out of this view.
    #[instrument(skip(self))]
    pub async fn rider_orders(&self, rider: &RiderId) -> Result<Vec<Order>, OrderError> {
        self.find(OrderFilter {
            rider_id: Some(rider.clone()),
            status_not_in: Some(OrderStatus::TERMINAL.to_vec()),
            ..Default::default()
        })
        .await
    }

    /// A customer's full order history, newest-first.
    #[instrument(skip(self))]
    pub async fn customer_orders(&self, customer: &CustomerId) -> Result<Vec<Order>, OrderError> {
        self.find(OrderFilter {
            customer_id: Some(customer.clone()),
            ..Default::default()
        })
        .await
    }

    async fn find(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        retry(&self.retry, "orders.find", || self.store.find(&filter))
            .await
            .map_err(|e| self.map_store_error(e, None))
    }

    /// Translates storage errors into the domain vocabulary. `id` supplies
    /// context for per-record failures; list operations pass `None` and can
    /// only fail as unavailable.
    fn map_store_error(&self, e: StoreError, id: Option<OrderId>) -> OrderError {
        match (e, id) {
            (StoreError::NotFound(raw), id) => {
                OrderError::NotFound(id.unwrap_or_else(|| parse_order_id(&raw)))
            }
            (StoreError::Conflict(holder), Some(order_id)) => OrderError::AlreadyAssigned {
                order_id,
                rider_id: RiderId::from(holder),
            },
            (StoreError::Conflict(holder), None) => {
                OrderError::Validation(format!("unexpected conflict with {holder}"))
            }
            (StoreError::Unavailable(reason), _) => OrderError::StoreUnavailable {
                attempts: self.retry.max_attempts(),
                reason,
            },
        }
    }
}

fn parse_order_id(raw: &str) -> OrderId {
    raw.strip_prefix("order_")
        .and_then(|n| n.parse().ok())
        .map(OrderId)
        .unwrap_or(OrderId(0))
}
