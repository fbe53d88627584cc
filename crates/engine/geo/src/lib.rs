//! Geographic coordinate handling for Streetforge
//!
//! This crate provides the numeric foundation of the address-to-level
//! pipeline: coordinate validation, safe bounding-box computation around a
//! center point, and the local tangent-plane projection that places
//! geographic points into game-world space.
//!
//! # Modules
//!
//! - [`coords`]: Geographic coordinate type and validation
//! - [`bbox`]: Bounding boxes with pole and antimeridian clamping
//! - [`projection`]: Local tangent-plane projection into world space
//! - [`error`]: Error types for coordinate operations

pub mod bbox;
pub mod coords;
pub mod error;
pub mod projection;

pub use bbox::BoundingBox;
pub use coords::GeoCoord;
pub use error::{GeoError, Result};
pub use projection::LocalProjection;

/// Approximate meters per degree of latitude (WGS84 mean).
///
/// Shared by the bounding-box math and the projection so the two can never
/// disagree about scale.
pub const METERS_PER_DEG_LAT: f64 = 111_320.0;

/// Lower bound applied to `cos(latitude)` when converting a longitude span.
///
/// Near the poles the cosine approaches zero and a meters-to-degrees
/// conversion would blow up; clamping trades an oversized longitude span
/// for a bounded one, and the resulting box is still clamped to valid
/// longitudes afterwards.
pub const MIN_LATITUDE_COS: f64 = 0.01;

/// `cos(latitude)` with the polar floor applied.
pub(crate) fn clamped_lat_cos(lat_deg: f64) -> f64 {
    lat_deg.to_radians().cos().max(MIN_LATITUDE_COS)
}
