//! Address resolution pipeline for Streetforge
//!
//! Turns a free-text address into a parsed [`MapModel`]: geocode the
//! address, compute a validated bounding box around the hit, fetch map
//! features for that box, and parse them. Each resolve request has exactly
//! one terminal outcome; a newer request supersedes an in-flight one, and
//! superseded responses are discarded rather than applied.
//!
//! # Modules
//!
//! - [`providers`]: The geocoder and map-data provider seams
//! - [`nominatim`]: Nominatim geocoding client
//! - [`overpass`]: Overpass map-data client and query construction
//! - [`resolver`]: The pipeline state machine
//! - [`config`]: Resolver configuration
//! - [`error`]: Error taxonomy for resolve requests
//!
//! [`MapModel`]: streetforge_mapdata::MapModel

pub mod config;
pub mod error;
pub mod nominatim;
pub mod overpass;
pub mod providers;
pub mod resolver;

pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use nominatim::NominatimGeocoder;
pub use overpass::OverpassClient;
pub use providers::{GeocodedPlace, Geocoder, MapDataSource};
pub use resolver::{AddressResolver, ResolvePhase};

/// User agent sent with every outbound request
///
/// Both upstream services ask automated clients to identify themselves.
pub const USER_AGENT: &str = concat!("streetforge/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client used by both providers
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().user_agent(USER_AGENT).build()
}
