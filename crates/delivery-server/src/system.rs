//! # System Wiring
//!
//! [`DeliverySystem`] is the composition root: it builds the stores, hands
//! them to the engine and hub, and exposes both. Nothing else in the crate
//! constructs those pieces, which keeps the dependency direction one-way:
//! stores know nobody, engine and hub know their store, the system knows
//! everything.

use crate::config::SystemConfig;
use crate::engine::OrderEngine;
use crate::hub::LocationHub;
use crate::store::{LocationStore, MemoryLocationStore, MemoryOrderStore, OrderStore};
use std::sync::Arc;
use tracing::info;

/// The wired-up delivery backend: lifecycle engine plus location hub.
pub struct DeliverySystem {
    pub engine: OrderEngine,
    pub hub: Arc<LocationHub>,
}

impl DeliverySystem {
    /// In-memory stores, default configuration.
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    /// In-memory stores, caller-supplied configuration.
    pub fn with_config(config: SystemConfig) -> Self {
        Self::with_stores(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(MemoryLocationStore::new()),
            config,
        )
    }

    /// Fully injected wiring; tests use this to slot in fault-injecting
    /// stores.
    pub fn with_stores(
        orders: Arc<dyn OrderStore>,
        locations: Arc<dyn LocationStore>,
        config: SystemConfig,
    ) -> Self {
        info!(
            hub_queue_capacity = config.hub_queue_capacity,
            max_retries = config.retry.max_retries,
            "delivery system starting"
        );
        Self {
            engine: OrderEngine::new(orders, config.retry),
            hub: Arc::new(LocationHub::new(locations, config.hub_queue_capacity)),
        }
    }
}

impl Default for DeliverySystem {
    fn default() -> Self {
        Self::new()
    }
}
