//! Incremental level generation for Streetforge
//!
//! Consumes a parsed [`MapModel`] and materializes it into world objects
//! through the [`LevelScene`] collaborator: road strips, extruded building
//! volumes, flat area regions, collectibles at points of interest, and
//! exactly one goal zone and spawn point. Work is queued and drained in
//! bounded batches so a single generation never stalls the host loop, and
//! a new generation cancels and tears down the previous one first.
//!
//! [`MapModel`]: streetforge_mapdata::MapModel

pub mod generator;
pub mod scene;

pub use generator::{GeneratorConfig, GeneratorStatus, MapGenerator};
pub use scene::{LevelScene, MemoryScene, ObjectKind, SceneEvent, SceneId};
