//! Parsed map feature model for Streetforge
//!
//! This crate owns the in-memory representation of fetched map data: roads,
//! buildings, land-use areas, and points of interest, each with the derived
//! attributes the level generator needs (road class, building height, area
//! kind). The parser consumes the map-data service's loose JSON and is
//! strictly defensive: a malformed element costs that element, never the
//! whole parse.

pub mod model;
pub mod parse;

pub use model::{
    AreaKind, Building, GeoPoint, MapArea, MapDataConfig, MapModel, PointOfInterest, Road,
    RoadClass, TagMap,
};
pub use parse::ParseStats;
