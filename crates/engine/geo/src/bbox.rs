//! Bounding boxes with pole and antimeridian clamping
//!
//! Map-data services reject queries with inverted or out-of-range bounds,
//! so boxes are validated locally before any network round-trip. The
//! constructor guarantees that a box built from a valid center and radius
//! always passes [`BoundingBox::is_valid`], including centers next to a
//! pole or the antimeridian.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::GeoCoord;
use crate::error::{GeoError, Result};
use crate::{clamped_lat_cos, METERS_PER_DEG_LAT};

/// A rectangular area in geographic coordinates
///
/// Defined by its southwest (minimum) and northeast (maximum) corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southwest corner (minimum lat/lon)
    pub min: GeoCoord,
    /// Northeast corner (maximum lat/lon)
    pub max: GeoCoord,
}

impl BoundingBox {
    /// Create a bounding box from southwest and northeast corners
    pub fn new(min: GeoCoord, max: GeoCoord) -> Self {
        Self { min, max }
    }

    /// Build a box of the given radius around a center point, clamped into
    /// valid coordinate space
    ///
    /// The radius converts to a latitude delta via the meters-per-degree
    /// approximation and to a longitude delta scaled by `1/cos(lat)`, with
    /// the cosine floored near the poles. Latitude is clamped into
    /// [-90, 90]. A box that would cross the antimeridian is clamped to
    /// the ±180° edge instead of wrapping, trading a smaller box for
    /// bounds the map-data service will accept.
    ///
    /// # Errors
    ///
    /// - [`GeoError::InvalidCoordinate`] if the center is out of range or
    ///   non-finite
    /// - [`GeoError::InvalidRadius`] if the radius is not a positive,
    ///   finite number of meters
    pub fn from_center_radius(center: GeoCoord, radius_m: f64) -> Result<Self> {
        if !center.is_valid() {
            return Err(GeoError::InvalidCoordinate {
                lat: center.lat,
                lon: center.lon,
            });
        }
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(GeoError::InvalidRadius(radius_m));
        }

        let dlat = radius_m / METERS_PER_DEG_LAT;
        let dlon = radius_m / (METERS_PER_DEG_LAT * clamped_lat_cos(center.lat));

        let min_lat = (center.lat - dlat).max(-90.0);
        let max_lat = (center.lat + dlat).min(90.0);
        let min_lon = (center.lon - dlon).max(-180.0);
        let max_lon = (center.lon + dlon).min(180.0);

        if min_lat != center.lat - dlat || max_lat != center.lat + dlat {
            debug!(lat = center.lat, "latitude span clamped at pole");
        }
        if min_lon != center.lon - dlon || max_lon != center.lon + dlon {
            debug!(lon = center.lon, "longitude span clamped at antimeridian");
        }

        let bbox = Self {
            min: GeoCoord::new(min_lat, min_lon),
            max: GeoCoord::new(max_lat, max_lon),
        };

        // A valid center and positive radius always leave a strict span
        // after clamping; anything else is an arithmetic bug.
        if !bbox.is_valid() {
            return Err(GeoError::InvalidBounds);
        }

        Ok(bbox)
    }

    /// Check the box invariants: both corners valid, strict `min < max`
    /// on each axis
    pub fn is_valid(&self) -> bool {
        self.min.is_valid()
            && self.max.is_valid()
            && self.min.lat < self.max.lat
            && self.min.lon < self.max.lon
    }

    /// Midpoint of the box
    pub fn center(&self) -> GeoCoord {
        GeoCoord::new(
            (self.min.lat + self.max.lat) / 2.0,
            (self.min.lon + self.max.lon) / 2.0,
        )
    }

    /// Longitude span in degrees
    pub fn width_deg(&self) -> f64 {
        self.max.lon - self.min.lon
    }

    /// Latitude span in degrees
    pub fn height_deg(&self) -> f64 {
        self.max.lat - self.min.lat
    }

    /// Approximate longitude span in meters at the box center
    pub fn width_m(&self) -> f64 {
        self.width_deg() * METERS_PER_DEG_LAT * clamped_lat_cos(self.center().lat)
    }

    /// Approximate latitude span in meters
    pub fn height_m(&self) -> f64 {
        self.height_deg() * METERS_PER_DEG_LAT
    }

    /// Check if a point lies within the box (corners inclusive)
    pub fn contains(&self, point: &GeoCoord) -> bool {
        point.lat >= self.min.lat
            && point.lat <= self.max.lat
            && point.lon >= self.min.lon
            && point.lon <= self.max.lon
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.5},{:.5},{:.5},{:.5})",
            self.min.lat, self.min.lon, self.max.lat, self.max.lon
        )
    }
}
