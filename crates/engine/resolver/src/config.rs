//! Resolver configuration

use std::{env, time::Duration};

use streetforge_geo::GeoCoord;
use streetforge_mapdata::MapDataConfig;

use crate::nominatim::DEFAULT_NOMINATIM_URL;
use crate::overpass::DEFAULT_OVERPASS_URL;

/// Configuration for the address-resolution pipeline
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Half-size of the fetched area, in meters from the geocoded center
    pub radius_m: f64,
    /// Known-good location used when geocoding fails terminally; `None`
    /// surfaces the failure to the caller instead
    pub fallback: Option<GeoCoord>,
    /// Base URL of the geocoding service
    pub geocoder_url: String,
    /// Interpreter endpoint of the map-data service
    pub overpass_url: String,
    /// Per-request timeout for both services
    pub timeout: Duration,
    /// Delay before the single automatic retry
    pub retry_delay: Duration,
    /// Automatic retries per network call; the pipeline's budget is one
    pub max_retries: u32,
    /// Attribute-derivation constants handed to the parser
    pub map_data: MapDataConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            radius_m: 500.0,
            fallback: None,
            geocoder_url: DEFAULT_NOMINATIM_URL.to_string(),
            overpass_url: DEFAULT_OVERPASS_URL.to_string(),
            timeout: Duration::from_secs(25),
            retry_delay: Duration::from_millis(500),
            max_retries: 1,
            map_data: MapDataConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Builds a configuration from environment variables while falling
    /// back to the defaults
    ///
    /// Recognized variables: `STREETFORGE_GEOCODER_URL`,
    /// `STREETFORGE_OVERPASS_URL`, `STREETFORGE_RADIUS_M`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("STREETFORGE_GEOCODER_URL") {
            config.geocoder_url = url;
        }
        if let Ok(url) = env::var("STREETFORGE_OVERPASS_URL") {
            config.overpass_url = url;
        }
        if let Some(radius) = env::var("STREETFORGE_RADIUS_M")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.radius_m = radius;
        }
        config
    }

    /// Set the fetch radius in meters
    pub fn with_radius_m(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }

    /// Set the fallback location used on terminal geocoding failure
    pub fn with_fallback(mut self, fallback: GeoCoord) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry delay
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the number of automatic retries per network call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.radius_m, 500.0);
        assert_eq!(config.max_retries, 1);
        assert!(config.fallback.is_none());
        assert_eq!(config.geocoder_url, DEFAULT_NOMINATIM_URL);
        assert_eq!(config.overpass_url, DEFAULT_OVERPASS_URL);
    }

    #[test]
    fn test_builders() {
        let config = ResolverConfig::default()
            .with_radius_m(1_000.0)
            .with_fallback(GeoCoord::new(51.3397, 12.3731))
            .with_max_retries(0);

        assert_eq!(config.radius_m, 1_000.0);
        assert!(config.fallback.is_some());
        assert_eq!(config.max_retries, 0);
    }
}
