//! # Location Broadcast Hub
//!
//! Riders publish position samples; every session watching the rider's
//! order receives them in real time. The hub persists each sample through
//! the [`LocationStore`] and fans it out over a [`TopicHub`] keyed by order
//! id.
//!
//! ## Delivery guarantees
//! - At-least-once to sessions subscribed at publish time; nothing is
//!   replayed to late joiners - the next sample supersedes anyway.
//! - Sessions watching a different order never see the event, even for the
//!   same rider.
//! - Persistence and broadcast are independent outcomes: a store failure is
//!   logged and the broadcast still goes out. Live tracking stays live even
//!   when the database blinks.

use crate::error::LocationError;
use crate::model::{GeoPoint, OrderId, RiderId, RiderLocation, SessionId};
use crate::store::LocationStore;
use delivery_core::TopicHub;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

/// A rider's position report, as it arrives from the rider's device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub rider_id: RiderId,
    pub order_id: OrderId,
    pub longitude: f64,
    pub latitude: f64,
    /// Compass heading in degrees; devices without a compass send `0`.
    #[serde(default)]
    pub heading: f64,
}

impl LocationSample {
    /// Checks ranges before the sample touches store or subscribers.
    pub fn validate(&self) -> Result<(), String> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err("latitude out of range".into());
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err("longitude out of range".into());
        }
        if !self.heading.is_finite() || !(0.0..360.0).contains(&self.heading) {
            return Err("heading must be within [0, 360)".into());
        }
        Ok(())
    }
}

/// What subscribers of an order's channel receive per sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub rider_id: RiderId,
    pub longitude: f64,
    pub latitude: f64,
    pub heading: f64,
}

/// Order-scoped publish/subscribe channel for rider positions.
pub struct LocationHub {
    topics: TopicHub<OrderId, SessionId, LocationUpdate>,
    store: Arc<dyn LocationStore>,
}

impl LocationHub {
    /// `queue_capacity` bounds the undelivered events each session may
    /// accumulate before it starts losing samples.
    pub fn new(store: Arc<dyn LocationStore>, queue_capacity: usize) -> Self {
        Self {
            topics: TopicHub::new(queue_capacity),
            store,
        }
    }

    /// Starts delivering future updates for `order_id` to `session`.
    ///
    /// No backlog is replayed. Re-subscribing replaces the session's
    /// previous queue for this order; each publish is still delivered at
    /// most once per session.
    pub fn subscribe(&self, session: SessionId, order_id: OrderId) -> mpsc::Receiver<LocationUpdate> {
        debug!(%session, %order_id, "session subscribed");
        self.topics.subscribe(order_id, session)
    }

    /// Stops delivery to `session` for `order_id`. Dropping the receiver
    /// has the same effect one publish later.
    pub fn unsubscribe(&self, session: &SessionId, order_id: &OrderId) {
        debug!(%session, %order_id, "session unsubscribed");
        self.topics.unsubscribe(order_id, session);
    }

    /// Sessions currently watching `order_id`.
    pub fn watchers(&self, order_id: &OrderId) -> usize {
        self.topics.subscriber_count(order_id)
    }

    /// Persists the sample and broadcasts it to the order's watchers.
    ///
    /// Returns how many subscriber queues accepted the update. A store
    /// failure is logged at `warn` and does not suppress the broadcast;
    /// there is no retry, the next sample will overwrite anyway.
    #[instrument(skip(self, sample), fields(rider_id = %sample.rider_id, order_id = %sample.order_id))]
    pub async fn publish(&self, sample: LocationSample) -> Result<usize, LocationError> {
        sample.validate().map_err(LocationError::Validation)?;

        let record = RiderLocation {
            rider_id: sample.rider_id.clone(),
            order_id: Some(sample.order_id),
            position: GeoPoint {
                longitude: sample.longitude,
                latitude: sample.latitude,
            },
            heading: sample.heading,
            timestamp: chrono::Utc::now(),
        };
        if let Err(e) = self.store.upsert(record).await {
            warn!(error = %e, "failed to persist location sample, broadcasting anyway");
        }

        let update = LocationUpdate {
            rider_id: sample.rider_id,
            longitude: sample.longitude,
            latitude: sample.latitude,
            heading: sample.heading,
        };
        let delivered = self.topics.publish(&sample.order_id, update);
        debug!(delivered, "location update fanned out");
        Ok(delivered)
    }
}
