//! Pure data structures of the delivery domain.
//!
//! Entities here carry no behavior beyond construction and validation; the
//! engine and hub own all workflow logic, the stores own identity and
//! timestamps.

pub mod ids;
pub mod location;
pub mod order;

pub use ids::{CustomerId, OrderId, RestaurantId, RiderId, SessionId};
pub use location::{GeoPoint, RiderLocation};
pub use order::{
    DeliveryAddress, Order, OrderCreate, OrderItem, OrderStatus, OrderUpdate, PaymentMethod,
};
