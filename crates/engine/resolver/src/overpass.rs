//! Overpass map-data client and query construction
//!
//! The query selects the pragmatic feature subset the level generator
//! consumes: highway and building ways, land-use ways, and tagged nodes,
//! all scoped to one bounding box. `out geom` makes ways carry their
//! vertex coordinates inline, so no second lookup pass is needed.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use streetforge_geo::BoundingBox;

use crate::error::{ResolveError, Result};
use crate::providers::MapDataSource;

/// Public Overpass instance
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Default timeout for map-data requests; also sent to the server as the
/// query's own timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Overpass API client
pub struct OverpassClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl OverpassClient {
    /// Create a client against the given interpreter endpoint
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request (and server-side query) timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the Overpass QL query for one bounding box
///
/// Bounds are formatted as `minLat,minLon,maxLat,maxLon` decimal degrees,
/// the order Overpass expects.
pub fn build_query(bounds: &BoundingBox, timeout: Duration) -> String {
    let bbox = format!(
        "{:.7},{:.7},{:.7},{:.7}",
        bounds.min.lat, bounds.min.lon, bounds.max.lat, bounds.max.lon
    );
    let timeout_s = timeout.as_secs().max(1);

    format!(
        "[out:json][timeout:{timeout_s}];\n\
         (\n\
         \x20 way[\"highway\"]({bbox});\n\
         \x20 way[\"building\"]({bbox});\n\
         \x20 way[\"leisure\"]({bbox});\n\
         \x20 way[\"landuse\"]({bbox});\n\
         \x20 way[\"natural\"]({bbox});\n\
         \x20 way[\"waterway\"]({bbox});\n\
         \x20 node[\"amenity\"]({bbox});\n\
         \x20 node[\"shop\"]({bbox});\n\
         \x20 node[\"tourism\"]({bbox});\n\
         \x20 node[\"historic\"]({bbox});\n\
         );\n\
         out geom;"
    )
}

#[async_trait]
impl MapDataSource for OverpassClient {
    async fn fetch(&self, bounds: &BoundingBox) -> Result<Value> {
        // A degenerate box must never reach the wire; the service would
        // reject it anyway, but locally the error is attributable.
        if !bounds.is_valid() {
            return Err(ResolveError::InvalidBounds);
        }

        let query = build_query(bounds, self.timeout);
        debug!(%bounds, "fetching map data");

        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::UpstreamStatus {
                service: "overpass",
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ResolveError::FetchFailed(format!("unreadable map data response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streetforge_geo::GeoCoord;

    fn bounds() -> BoundingBox {
        BoundingBox::from_center_radius(GeoCoord::new(51.3397, 12.3731), 500.0).unwrap()
    }

    #[test]
    fn test_query_contains_bbox_in_order() {
        let b = bounds();
        let query = build_query(&b, Duration::from_secs(25));

        let bbox = format!(
            "{:.7},{:.7},{:.7},{:.7}",
            b.min.lat, b.min.lon, b.max.lat, b.max.lon
        );
        assert!(query.contains(&bbox));
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains("way[\"highway\"]"));
        assert!(query.contains("way[\"building\"]"));
        assert!(query.contains("node[\"amenity\"]"));
        assert!(query.ends_with("out geom;"));
    }

    #[test]
    fn test_query_timeout_floor() {
        let query = build_query(&bounds(), Duration::from_millis(100));
        assert!(query.starts_with("[out:json][timeout:1];"));
    }

    #[tokio::test]
    async fn test_invalid_bounds_never_sent() {
        // Unroutable URL: if the guard fails, the request itself errors
        // differently and the assertion catches it.
        let client = OverpassClient::new(reqwest::Client::new(), "http://127.0.0.1:1");

        let inverted = BoundingBox::new(GeoCoord::new(46.0, -122.0), GeoCoord::new(45.0, -121.0));
        let result = client.fetch(&inverted).await;
        assert!(matches!(result, Err(ResolveError::InvalidBounds)));
    }
}
