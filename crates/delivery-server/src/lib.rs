//! # Delivery Server
//!
//! Backend coordination for a three-sided food-delivery product: customers
//! place orders, restaurants work them, riders claim and carry them, and
//! everyone watches the rider move on a map. This crate owns the two parts
//! with real concurrency in them - the order lifecycle with rider-claim
//! arbitration, and the live-location broadcast channel. HTTP routing,
//! auth, and payload normalization are an upstream gateway's problem.
//!
//! ## Module Tour
//!
//! ### 1. The Data ([`model`])
//! Pure domain types: [`Order`](model::Order) with its status machine,
//! [`RiderLocation`](model::RiderLocation), id newtypes, and the validation
//! functions the engine runs before any write.
//!
//! ### 2. The Storage Seam ([`store`])
//! [`OrderStore`](store::OrderStore) and [`LocationStore`](store::LocationStore)
//! traits with in-memory implementations. The one non-negotiable promise:
//! per-record atomic read-modify-write, which is what makes the rider claim
//! a genuine compare-and-set.
//!
//! ### 3. The Workflow ([`engine`])
//! [`OrderEngine`](engine::OrderEngine) validates, applies, and lists.
//! At-most-one-rider is enforced here (through the store's CAS); status
//! updates are membership-checked, deliberately not adjacency-checked.
//!
//! ### 4. The Live Channel ([`hub`])
//! [`LocationHub`](hub::LocationHub) fans rider positions out to the
//! sessions watching each order - bounded queues, non-blocking sends, and a
//! strict "broadcast even if persistence failed" policy.
//!
//! ### 5. The Wiring ([`system`], [`config`])
//! [`DeliverySystem`](system::DeliverySystem) composes stores, engine, and
//! hub from a [`SystemConfig`](config::SystemConfig).
//!
//! ## Concurrency Model
//!
//! Orders are independent resources: claims on the same order are settled
//! by a per-record compare-and-set, claims on different orders never touch
//! a shared lock. The hub's subscriber registry is sharded the same way,
//! and a publish never awaits a subscriber - slow consumers lose samples,
//! they do not stall riders.
//!
//! ## Quick Start
//!
//! ```rust
//! use delivery_server::model::{DeliveryAddress, OrderCreate, OrderItem, PaymentMethod};
//! use delivery_server::system::DeliverySystem;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let system = DeliverySystem::new();
//!
//! let order = system
//!     .engine
//!     .create(OrderCreate {
//!         customer_id: "cust_7".into(),
//!         restaurant_id: "resto_3".into(),
//!         items: vec![OrderItem {
//!             item_id: "i1".into(),
//!             name: "Pizza".into(),
//!             qty: 2,
//!             price: 10.0,
//!         }],
//!         delivery_address: DeliveryAddress {
//!             latitude: 1.0,
//!             longitude: 2.0,
//!             address_text: "Home".into(),
//!         },
//!         total_amount: Some(20.0),
//!         payment_method: PaymentMethod::CashOnDelivery,
//!     })
//!     .await?;
//!
//! let claimed = system.engine.accept_order(&"rider_1".into(), &order.id).await?;
//! assert_eq!(claimed.rider_id, Some("rider_1".into()));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hub;
pub mod model;
pub mod store;
pub mod system;

// Re-export the types most callers need
pub use config::SystemConfig;
pub use engine::OrderEngine;
pub use error::{LocationError, OrderError};
pub use hub::{LocationHub, LocationSample, LocationUpdate};
pub use system::DeliverySystem;
