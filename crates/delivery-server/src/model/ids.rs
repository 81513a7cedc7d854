//! Identifier newtypes for the delivery domain.
//!
//! Only [`OrderId`] is generated by this service; customer, restaurant, and
//! rider ids are issued by the identity gateway upstream and travel through
//! here as opaque strings. Wrapping each in its own type keeps a rider id
//! from ever being passed where a customer id belongs.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders, assigned by the order store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

macro_rules! external_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

external_id! {
    /// Externally issued customer identifier.
    CustomerId
}

external_id! {
    /// Externally issued restaurant identifier.
    RestaurantId
}

external_id! {
    /// Externally issued rider identifier.
    RiderId
}

external_id! {
    /// Identifies one connected observer session on the location channel.
    SessionId
}
