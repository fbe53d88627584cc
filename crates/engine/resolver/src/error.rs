//! Error taxonomy for resolve requests

/// Errors that can end a resolve request
///
/// The first five variants are the terminal outcomes surfaced to callers.
/// [`ResolveError::UpstreamStatus`] and [`ResolveError::Http`] are
/// transport-level carriers that drive the retry decision inside the
/// pipeline; by the time a request finishes they have been folded into
/// `GeocodeFailed` or `FetchFailed`.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The address string was empty or all whitespace
    #[error("address input is empty")]
    EmptyInput,

    /// Geocoding produced no usable coordinate (no match, or network
    /// failure after the retry budget)
    #[error("geocoding failed: {0}")]
    GeocodeFailed(String),

    /// A coordinate was out of range or non-finite
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A bounding box failed validation; no query was sent
    #[error("invalid bounding box")]
    InvalidBounds,

    /// The map-data fetch failed after the retry budget
    #[error("map data fetch failed: {0}")]
    FetchFailed(String),

    /// An upstream service answered with a non-success status
    #[error("{service} returned status {status}")]
    UpstreamStatus { service: &'static str, status: u16 },

    /// A newer resolve request replaced this one; the stale response was
    /// discarded
    #[error("resolve request superseded by a newer one")]
    Superseded,

    /// HTTP transport error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for resolve operations
pub type Result<T> = std::result::Result<T, ResolveError>;

impl ResolveError {
    /// Returns true if retrying the failed call might help
    pub fn is_retryable(&self) -> bool {
        match self {
            ResolveError::Http(e) => e.is_timeout() || e.is_connect(),
            ResolveError::UpstreamStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ResolveError::UpstreamStatus {
            service: "overpass",
            status: 503
        }
        .is_retryable());
        assert!(!ResolveError::UpstreamStatus {
            service: "overpass",
            status: 400
        }
        .is_retryable());
        assert!(!ResolveError::EmptyInput.is_retryable());
        assert!(!ResolveError::GeocodeFailed("no match".into()).is_retryable());
        assert!(!ResolveError::Superseded.is_retryable());
    }
}
