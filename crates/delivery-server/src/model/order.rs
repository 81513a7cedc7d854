//! The Order entity, its status machine, and creation-time validation.

use crate::model::{CustomerId, OrderId, RestaurantId, RiderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Lifecycle status of an order.
///
/// The happy path runs `pending → preparing → ready → accepted →
/// pickup_completed → delivery_started → delivered`; `cancelled` and
/// `failed` are terminal exits reachable from any non-terminal state.
///
/// # Architecture Note
/// Status updates are validated for *membership only*: any recognized value
/// is accepted regardless of the current status. Operational corrections
/// (support rolling an order back a step) rely on this, at the cost of
/// permitting non-monotonic transitions. Adjacency enforcement is a product
/// decision that has deliberately not been made here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Accepted,
    PickupCompleted,
    /// On the way to the customer. `out_for_delivery` is accepted as a
    /// legacy spelling on input.
    #[serde(alias = "out_for_delivery")]
    DeliveryStarted,
    Delivered,
    Cancelled,
    Failed,
}

impl OrderStatus {
    /// Statuses shown on restaurant dashboards.
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Accepted,
    ];

    /// Statuses an unassigned order may hold while riders can still claim it.
    pub const CLAIMABLE: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    /// Statuses after which no further work happens on an order.
    pub const TERMINAL: [OrderStatus; 3] = [
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Failed,
    ];

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Accepted => "accepted",
            OrderStatus::PickupCompleted => "pickup_completed",
            OrderStatus::DeliveryStarted => "delivery_started",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    /// The unrecognized input, handed back for error reporting.
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "preparing" => Ok(OrderStatus::Preparing),
            "ready" => Ok(OrderStatus::Ready),
            "accepted" => Ok(OrderStatus::Accepted),
            "pickup_completed" => Ok(OrderStatus::PickupCompleted),
            "delivery_started" | "out_for_delivery" => Ok(OrderStatus::DeliveryStarted),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "failed" => Ok(OrderStatus::Failed),
            other => Err(other.to_string()),
        }
    }
}

/// How the customer pays for the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CashOnDelivery,
    Online,
}

/// One line of an order. Price is captured at order time and never updated
/// when the menu changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,
    pub name: String,
    pub qty: u32,
    pub price: f64,
}

/// Where the order is going. Snapshotted on creation; a customer moving
/// after ordering does not move the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub latitude: f64,
    pub longitude: f64,
    pub address_text: String,
}

/// A customer's placed order, tracked through the delivery lifecycle.
///
/// `items` and `delivery_address` never change after creation. `rider_id`
/// is set at most once, by a successful claim. Timestamps are owned by the
/// order store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub rider_id: Option<RiderId>,
    pub items: Vec<OrderItem>,
    pub delivery_address: DeliveryAddress,
    /// Caller-supplied; the engine never derives it from the items.
    pub total_amount: Option<f64>,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// Shareable tracking URL, settable only once a rider is assigned.
    pub live_tracking_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds the stored form of a new order. Called by the order store
    /// after [`OrderCreate::validate`] has passed.
    pub fn create(id: OrderId, params: OrderCreate, now: DateTime<Utc>) -> Self {
        Self {
            id,
            customer_id: params.customer_id,
            restaurant_id: params.restaurant_id,
            rider_id: None,
            items: params.items,
            delivery_address: params.delivery_address,
            total_amount: params.total_amount,
            payment_method: params.payment_method,
            status: OrderStatus::Pending,
            live_tracking_link: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Payload for creating a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub items: Vec<OrderItem>,
    pub delivery_address: DeliveryAddress,
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl OrderCreate {
    /// Checks the payload before anything touches the store.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("order must contain at least one item".into());
        }
        for item in &self.items {
            if item.qty < 1 {
                return Err(format!("item {} has non-positive quantity", item.item_id));
            }
            if !(item.price >= 0.0) {
                return Err(format!("item {} has negative price", item.item_id));
            }
        }
        let addr = &self.delivery_address;
        if !addr.latitude.is_finite() || !(-90.0..=90.0).contains(&addr.latitude) {
            return Err("delivery address latitude out of range".into());
        }
        if !addr.longitude.is_finite() || !(-180.0..=180.0).contains(&addr.longitude) {
            return Err("delivery address longitude out of range".into());
        }
        if addr.address_text.trim().is_empty() {
            return Err("delivery address text is required".into());
        }
        if let Some(total) = self.total_amount {
            if !(total >= 0.0) {
                return Err("total amount must not be negative".into());
            }
        }
        Ok(())
    }
}

/// Fields a status update may change on an existing order.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub live_tracking_link: Option<String>,
}
