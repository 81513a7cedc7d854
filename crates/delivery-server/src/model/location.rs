//! Rider position types.

use crate::model::{OrderId, RiderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point on the map. Longitude first to match the wire convention of the
/// geo stack the location store mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

const EARTH_RADIUS_KM: f64 = 6371.0;

impl GeoPoint {
    /// Great-circle distance to `other` in kilometers.
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let lat_a = self.latitude.to_radians();
        let lat_b = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// The single live position record of one rider.
///
/// Keyed by `rider_id`: a new report replaces the previous one, it never
/// appends. Stale records are superseded rather than deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderLocation {
    pub rider_id: RiderId,
    /// The order the rider is currently servicing, if any.
    pub order_id: Option<OrderId>,
    pub position: GeoPoint,
    /// Compass heading in degrees, `[0, 360)`.
    pub heading: f64,
    /// Last update time, stamped by the location store.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_zero_for_same_point() {
        let p = GeoPoint {
            longitude: 13.4,
            latitude: 52.5,
        };
        assert!(p.haversine_km(&p) < 1e-9);
    }

    #[test]
    fn haversine_known_distance() {
        // Berlin -> Hamburg is roughly 255 km.
        let berlin = GeoPoint {
            longitude: 13.405,
            latitude: 52.52,
        };
        let hamburg = GeoPoint {
            longitude: 9.993,
            latitude: 53.551,
        };
        let km = berlin.haversine_km(&hamburg);
        assert!((250.0..260.0).contains(&km), "got {km} km");
    }
}
