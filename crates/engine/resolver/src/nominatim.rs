//! Nominatim geocoding client
//!
//! Speaks the public Nominatim search API. The response is treated as
//! untrusted: coordinates arrive as strings and may be missing or
//! non-numeric, none of which may crash the pipeline.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use streetforge_geo::GeoCoord;

use crate::error::{ResolveError, Result};
use crate::providers::{GeocodedPlace, Geocoder};

/// Public Nominatim instance
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Default timeout for geocoding requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Nominatim search client
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl NominatimGeocoder {
    /// Create a client against the given Nominatim base URL
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One entry of a Nominatim search response
///
/// Coordinates are strings in the wire format; missing fields default so a
/// sparse entry deserializes instead of erroring.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    #[serde(default)]
    lat: String,
    #[serde(default)]
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Turn the first search hit into a place, rejecting non-numeric or
/// out-of-range coordinates
fn place_from_response(query: &str, mut places: Vec<NominatimPlace>) -> Result<GeocodedPlace> {
    if places.is_empty() {
        return Err(ResolveError::GeocodeFailed(format!(
            "no match for \"{query}\""
        )));
    }
    let place = places.remove(0);

    let lat = place.lat.trim().parse::<f64>();
    let lon = place.lon.trim().parse::<f64>();
    let coord = match (lat, lon) {
        (Ok(lat), Ok(lon)) => GeoCoord::new(lat, lon),
        _ => {
            return Err(ResolveError::GeocodeFailed(format!(
                "non-numeric coordinates for \"{query}\""
            )))
        }
    };
    if !coord.is_valid() {
        return Err(ResolveError::GeocodeFailed(format!(
            "out-of-range coordinates {coord} for \"{query}\""
        )));
    }

    Ok(GeocodedPlace {
        coord,
        display_name: place.display_name,
    })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace> {
        let url = format!("{}/search", self.base_url);
        debug!(query, "geocoding address");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::UpstreamStatus {
                service: "nominatim",
                status: status.as_u16(),
            });
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            ResolveError::GeocodeFailed(format!("unreadable geocoder response: {e}"))
        })?;

        place_from_response(query, places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lat: &str, lon: &str) -> NominatimPlace {
        NominatimPlace {
            lat: lat.into(),
            lon: lon.into(),
            display_name: Some("Markt, Leipzig".into()),
        }
    }

    #[test]
    fn test_first_hit_wins() {
        let result = place_from_response(
            "Leipzig, Markt",
            vec![place("51.3397", "12.3731"), place("0.0", "0.0")],
        )
        .unwrap();

        assert!((result.coord.lat - 51.3397).abs() < 1e-9);
        assert!((result.coord.lon - 12.3731).abs() < 1e-9);
        assert_eq!(result.display_name.as_deref(), Some("Markt, Leipzig"));
    }

    #[test]
    fn test_no_match_is_geocode_failed() {
        let result = place_from_response("nowhere at all", vec![]);
        assert!(matches!(result, Err(ResolveError::GeocodeFailed(_))));
    }

    #[test]
    fn test_non_numeric_coordinates_rejected() {
        let result = place_from_response("x", vec![place("fifty-one", "12.37")]);
        assert!(matches!(result, Err(ResolveError::GeocodeFailed(_))));

        let result = place_from_response("x", vec![place("", "")]);
        assert!(matches!(result, Err(ResolveError::GeocodeFailed(_))));
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let result = place_from_response("x", vec![place("123.0", "12.37")]);
        assert!(matches!(result, Err(ResolveError::GeocodeFailed(_))));
    }
}
