//! The pipeline state machine
//!
//! One resolve request walks `Geocoding → BoundsComputed →
//! FetchingMapData → Parsing → Ready`, with `Failed` reachable from any
//! step. The providers are injected at construction; the pipeline itself
//! performs no I/O beyond what they do.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use streetforge_geo::{BoundingBox, GeoError};
use streetforge_mapdata::MapModel;

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::providers::{GeocodedPlace, Geocoder, MapDataSource};

/// Where a resolve request currently stands
///
/// Published through a watch channel; observers see the latest phase, and
/// the phase of a superseded request is never written over a newer one's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvePhase {
    /// No request has run yet
    Idle,
    /// Waiting on the geocoding service
    Geocoding,
    /// Bounding box computed and validated
    BoundsComputed,
    /// Waiting on the map-data service
    FetchingMapData,
    /// Parsing the fetched document
    Parsing,
    /// The most recent request delivered a model
    Ready,
    /// The most recent request ended in a terminal error
    Failed,
}

/// Resolves addresses into map models
///
/// Safe to share behind an `Arc`: a new call supersedes the previous one,
/// which observes the change at its next step boundary and finishes with
/// [`ResolveError::Superseded`] instead of delivering a stale model.
pub struct AddressResolver<G, M> {
    geocoder: G,
    map_source: M,
    config: ResolverConfig,
    phase_tx: watch::Sender<ResolvePhase>,
    generation: AtomicU64,
}

impl<G: Geocoder, M: MapDataSource> AddressResolver<G, M> {
    /// Create a resolver with its collaborators
    pub fn new(geocoder: G, map_source: M, config: ResolverConfig) -> Self {
        let (phase_tx, _) = watch::channel(ResolvePhase::Idle);
        Self {
            geocoder,
            map_source,
            config,
            phase_tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Subscribe to phase changes
    pub fn phase(&self) -> watch::Receiver<ResolvePhase> {
        self.phase_tx.subscribe()
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve an address into a parsed map model
    ///
    /// Exactly one terminal outcome per call: a model, a typed error, or
    /// [`ResolveError::Superseded`] when a newer call replaced this one.
    pub async fn resolve(&self, address: &str) -> Result<MapModel> {
        let address = address.trim();
        // Rejected before taking a ticket so that bad input cannot
        // supersede a request already in flight.
        if address.is_empty() {
            return Err(ResolveError::EmptyInput);
        }

        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.run_pipeline(address, ticket).await;

        match &result {
            Ok(model) => {
                debug!(features = model.feature_count(), "resolve complete");
                self.set_phase(ticket, ResolvePhase::Ready);
            }
            Err(ResolveError::Superseded) => {}
            Err(error) => {
                warn!(%error, "resolve failed");
                self.set_phase(ticket, ResolvePhase::Failed);
            }
        }
        result
    }

    async fn run_pipeline(&self, address: &str, ticket: u64) -> Result<MapModel> {
        self.set_phase(ticket, ResolvePhase::Geocoding);
        let place = match self
            .with_retry(ticket, || self.geocoder.geocode(address))
            .await
        {
            Ok(place) => place,
            Err(ResolveError::Superseded) => return Err(ResolveError::Superseded),
            Err(error) => match self.config.fallback {
                Some(coord) => {
                    warn!(%error, "geocoding failed, using configured fallback location");
                    GeocodedPlace {
                        coord,
                        display_name: None,
                    }
                }
                None => {
                    return Err(match error {
                        e @ ResolveError::GeocodeFailed(_) => e,
                        other => ResolveError::GeocodeFailed(other.to_string()),
                    })
                }
            },
        };
        self.check_current(ticket)?;

        let bounds =
            BoundingBox::from_center_radius(place.coord, self.config.radius_m).map_err(|e| {
                match e {
                    GeoError::InvalidCoordinate { lat, lon } => {
                        ResolveError::InvalidCoordinate { lat, lon }
                    }
                    GeoError::InvalidRadius(_) | GeoError::InvalidBounds => {
                        ResolveError::InvalidBounds
                    }
                }
            })?;
        self.set_phase(ticket, ResolvePhase::BoundsComputed);

        // Construction guarantees validity; re-checked so a degenerate box
        // can never reach the wire even if that guarantee regresses.
        if !bounds.is_valid() {
            return Err(ResolveError::InvalidBounds);
        }

        self.set_phase(ticket, ResolvePhase::FetchingMapData);
        let doc = match self
            .with_retry(ticket, || self.map_source.fetch(&bounds))
            .await
        {
            Ok(doc) => doc,
            Err(e @ (ResolveError::Superseded | ResolveError::InvalidBounds)) => return Err(e),
            Err(error) => {
                return Err(match error {
                    e @ ResolveError::FetchFailed(_) => e,
                    other => ResolveError::FetchFailed(other.to_string()),
                })
            }
        };
        self.check_current(ticket)?;

        // Parsing never fails; malformed elements only shrink the model.
        self.set_phase(ticket, ResolvePhase::Parsing);
        let model = MapModel::from_overpass(bounds, &doc, &self.config.map_data);
        self.check_current(ticket)?;

        Ok(model)
    }

    /// Run a provider call with the configured retry budget
    async fn with_retry<T, F, Fut>(&self, ticket: u64, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            self.check_current(ticket)?;
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(%error, attempt, "transient failure, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Fail with `Superseded` if a newer request has taken over
    fn check_current(&self, ticket: u64) -> Result<()> {
        if self.generation.load(Ordering::SeqCst) != ticket {
            return Err(ResolveError::Superseded);
        }
        Ok(())
    }

    /// Publish a phase change, unless this request is already stale
    fn set_phase(&self, ticket: u64, phase: ResolvePhase) {
        if self.generation.load(Ordering::SeqCst) == ticket {
            debug!(?phase, "resolver phase");
            self.phase_tx.send_replace(phase);
        }
    }
}
