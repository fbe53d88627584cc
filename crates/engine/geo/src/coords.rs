//! Geographic coordinate type and validation
//!
//! Latitude/longitude pairs use the WGS84 datum, the coordinate system
//! spoken by GPS, geocoders, and OpenStreetMap.

use serde::{Deserialize, Serialize};

/// Geographic coordinate (latitude/longitude in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoord {
    /// Latitude in degrees (-90 to 90, positive = north)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180, positive = east)
    pub lon: f64,
}

impl GeoCoord {
    /// Create a new geographic coordinate
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Check that both components are finite and within valid ranges
    ///
    /// Rejects NaN and infinite values as well as out-of-range degrees;
    /// external services hand back all of these in practice.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Approximate distance to another coordinate in meters
    /// using the Haversine formula
    pub fn distance_to(&self, other: &GeoCoord) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_M * c
    }
}

impl Default for GeoCoord {
    fn default() -> Self {
        // Null island
        Self { lat: 0.0, lon: 0.0 }
    }
}

impl std::fmt::Display for GeoCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}
