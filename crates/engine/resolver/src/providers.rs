//! Provider seams for the two external services
//!
//! The pipeline depends on these traits, not on the concrete HTTP
//! clients, so tests drive it with stub providers and no network.

use async_trait::async_trait;
use serde_json::Value;

use streetforge_geo::{BoundingBox, GeoCoord};

use crate::error::Result;

/// Best-match result of geocoding an address
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    /// Geographic position of the match
    pub coord: GeoCoord,
    /// Human-readable name of the match, if the service provided one
    pub display_name: Option<String>,
}

/// Converts a free-text address into a coordinate
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a query to its best match
    ///
    /// Returns [`ResolveError::GeocodeFailed`] when the service has no
    /// match for the query.
    ///
    /// [`ResolveError::GeocodeFailed`]: crate::error::ResolveError::GeocodeFailed
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace>;
}

/// Fetches raw map features for a bounding box
#[async_trait]
pub trait MapDataSource: Send + Sync {
    /// Fetch the raw feature document for the given bounds
    ///
    /// Implementations must refuse to issue a query for a box that fails
    /// [`BoundingBox::is_valid`].
    async fn fetch(&self, bounds: &BoundingBox) -> Result<Value>;
}
