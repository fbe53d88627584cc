//! Local tangent-plane projection into world space
//!
//! A flat approximation of a small patch of the Earth: longitude maps to
//! world X, latitude to world Z, with Y left at ground level. Valid for
//! areas up to a few kilometers across, which is all the level pipeline
//! ever requests.

use glam::Vec3;

use crate::bbox::BoundingBox;
use crate::coords::GeoCoord;
use crate::{clamped_lat_cos, METERS_PER_DEG_LAT};

/// Projection anchored at a bounding box's center
///
/// Uses the same meters-per-degree approximation as the bounding-box math,
/// so a box and the projection derived from it always agree about scale.
#[derive(Debug, Clone, Copy)]
pub struct LocalProjection {
    origin: GeoCoord,
    meters_per_deg_lat: f64,
    meters_per_deg_lon: f64,
}

impl LocalProjection {
    /// Create a projection centered on the given bounding box
    pub fn for_bounds(bounds: &BoundingBox) -> Self {
        let origin = bounds.center();
        Self {
            origin,
            meters_per_deg_lat: METERS_PER_DEG_LAT,
            meters_per_deg_lon: METERS_PER_DEG_LAT * clamped_lat_cos(origin.lat),
        }
    }

    /// The geographic point that maps to the world origin
    pub fn origin(&self) -> GeoCoord {
        self.origin
    }

    /// Project a geographic coordinate into world space
    ///
    /// X runs east, Z runs north, Y is 0 (ground level).
    pub fn project(&self, coord: &GeoCoord) -> Vec3 {
        let x = (coord.lon - self.origin.lon) * self.meters_per_deg_lon;
        let z = (coord.lat - self.origin.lat) * self.meters_per_deg_lat;
        Vec3::new(x as f32, 0.0, z as f32)
    }

    /// Inverse mapping from world space back to geographic coordinates
    pub fn unproject(&self, position: Vec3) -> GeoCoord {
        let lon = self.origin.lon + position.x as f64 / self.meters_per_deg_lon;
        let lat = self.origin.lat + position.z as f64 / self.meters_per_deg_lat;
        GeoCoord::new(lat, lon)
    }
}
