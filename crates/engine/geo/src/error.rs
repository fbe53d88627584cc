//! Error types for coordinate operations

/// Errors produced by coordinate validation and bounding-box construction
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// A latitude/longitude pair is out of range or non-finite
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// A requested radius is zero, negative, or non-finite
    #[error("invalid radius {0} m")]
    InvalidRadius(f64),

    /// A bounding box has inverted or out-of-range corners
    #[error("invalid bounding box")]
    InvalidBounds,
}

/// Result type for coordinate operations
pub type Result<T> = std::result::Result<T, GeoError>;
