//! Map feature types and their derived attributes
//!
//! All types here are immutable once constructed; a new address request
//! produces a new [`MapModel`] rather than mutating an old one.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use streetforge_geo::{BoundingBox, GeoCoord, LocalProjection};

/// Free-form key/value tags carried by a map element
pub type TagMap = BTreeMap<String, String>;

/// Tunable constants for attribute derivation
///
/// The source data documents neither a per-level height nor a default
/// building height, so both stay configurable instead of being buried as
/// magic numbers.
#[derive(Debug, Clone)]
pub struct MapDataConfig {
    /// Meters of building height per `building:levels` level
    pub per_level_height: f32,
    /// Building height when no usable tag is present
    pub default_building_height: f32,
}

impl Default for MapDataConfig {
    fn default() -> Self {
        Self {
            per_level_height: 3.0,
            default_building_height: 8.0,
        }
    }
}

impl MapDataConfig {
    /// Set the per-level height used for `building:levels` derivation
    pub fn with_per_level_height(mut self, meters: f32) -> Self {
        self.per_level_height = meters;
        self
    }

    /// Set the fallback building height
    pub fn with_default_building_height(mut self, meters: f32) -> Self {
        self.default_building_height = meters;
        self
    }
}

/// A single geographic point from the source data
///
/// Way vertices usually arrive bare; tags and a display name appear only
/// on points that came from a tagged node or a geocoder hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Source element id
    pub id: i64,
    /// Geographic position
    pub coord: GeoCoord,
    /// Free-form tags, empty for bare vertices
    #[serde(default)]
    pub tags: TagMap,
    /// Human-readable name, if the source provided one
    #[serde(default)]
    pub display_name: Option<String>,
}

impl GeoPoint {
    /// A bare, untagged point
    pub fn new(id: i64, coord: GeoCoord) -> Self {
        Self {
            id,
            coord,
            tags: TagMap::new(),
            display_name: None,
        }
    }

    /// Attach tags to the point
    pub fn with_tags(mut self, tags: TagMap) -> Self {
        self.tags = tags;
        self
    }

    /// Get a tag value by key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Rendering class of a road, derived from its `highway` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoadClass {
    Motorway,
    Primary,
    Secondary,
    Residential,
    Footway,
    Other,
}

impl RoadClass {
    /// Derive the class from a `highway` tag value
    pub fn from_highway(value: &str) -> Self {
        match value {
            "motorway" | "motorway_link" | "trunk" | "trunk_link" => RoadClass::Motorway,
            "primary" | "primary_link" => RoadClass::Primary,
            "secondary" | "secondary_link" | "tertiary" | "tertiary_link" => RoadClass::Secondary,
            "residential" | "unclassified" | "service" | "living_street" => RoadClass::Residential,
            "footway" | "path" | "pedestrian" | "cycleway" | "steps" | "track" => RoadClass::Footway,
            _ => RoadClass::Other,
        }
    }

    /// Strip width used when extruding the polyline
    pub fn width_m(&self) -> f32 {
        match self {
            RoadClass::Motorway => 16.0,
            RoadClass::Primary => 12.0,
            RoadClass::Secondary => 9.0,
            RoadClass::Residential => 6.0,
            RoadClass::Footway => 2.5,
            RoadClass::Other => 5.0,
        }
    }
}

/// A road polyline
///
/// Invariant: at least 2 points (enforced by the parser).
#[derive(Debug, Clone)]
pub struct Road {
    pub id: i64,
    pub tags: TagMap,
    pub points: Vec<GeoPoint>,
    pub class: RoadClass,
}

impl Road {
    /// Build a road, deriving its class from the `highway` tag
    pub fn new(id: i64, tags: TagMap, points: Vec<GeoPoint>) -> Self {
        let class = tags
            .get("highway")
            .map(|v| RoadClass::from_highway(v))
            .unwrap_or(RoadClass::Other);
        Self {
            id,
            tags,
            points,
            class,
        }
    }

    /// Get a tag value by key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// A building footprint with derived height
///
/// Invariants: footprint has at least 3 points, height is positive
/// (both enforced at construction/parse time).
#[derive(Debug, Clone)]
pub struct Building {
    pub id: i64,
    pub tags: TagMap,
    pub footprint: Vec<GeoPoint>,
    pub height: f32,
}

impl Building {
    /// Build a building, deriving height from its tags
    ///
    /// Derivation order: numeric `height` tag, then `building:levels`
    /// times the per-level constant, then the configured default.
    pub fn new(id: i64, tags: TagMap, footprint: Vec<GeoPoint>, config: &MapDataConfig) -> Self {
        let height = derive_height(&tags, config);
        Self {
            id,
            tags,
            footprint,
            height,
        }
    }

    /// Get a tag value by key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Derive a building height from its tags
fn derive_height(tags: &TagMap, config: &MapDataConfig) -> f32 {
    if let Some(height) = tags.get("height").and_then(|v| parse_meters(v)) {
        if height > 0.0 {
            return height;
        }
    }
    if let Some(levels) = tags
        .get("building:levels")
        .and_then(|v| v.trim().parse::<f32>().ok())
    {
        if levels > 0.0 {
            return levels * config.per_level_height;
        }
    }
    config.default_building_height
}

/// Parse a numeric tag value that may carry a trailing `m` unit
fn parse_meters(raw: &str) -> Option<f32> {
    raw.trim()
        .trim_end_matches('m')
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Category of a land-use area, derived once from its tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaKind {
    Park,
    Water,
    Other,
}

impl AreaKind {
    /// Fixed tag-to-kind lookup; computed once at construction and cached
    /// on the area, never recomputed
    pub fn from_tags(tags: &TagMap) -> Self {
        if tags.get("natural").map(String::as_str) == Some("water")
            || tags.contains_key("waterway")
            || matches!(
                tags.get("landuse").map(String::as_str),
                Some("reservoir") | Some("basin")
            )
        {
            return AreaKind::Water;
        }

        let leisure = tags.get("leisure").map(String::as_str);
        let landuse = tags.get("landuse").map(String::as_str);
        let natural = tags.get("natural").map(String::as_str);
        if matches!(
            leisure,
            Some("park") | Some("garden") | Some("pitch") | Some("playground")
        ) || matches!(
            landuse,
            Some("grass")
                | Some("forest")
                | Some("meadow")
                | Some("recreation_ground")
                | Some("village_green")
        ) || matches!(natural, Some("wood") | Some("scrub") | Some("grassland"))
        {
            return AreaKind::Park;
        }

        AreaKind::Other
    }
}

/// A land-use polygon
///
/// Invariant: footprint has at least 3 points.
#[derive(Debug, Clone)]
pub struct MapArea {
    pub id: i64,
    pub tags: TagMap,
    pub footprint: Vec<GeoPoint>,
    pub kind: AreaKind,
}

impl MapArea {
    pub fn new(id: i64, tags: TagMap, footprint: Vec<GeoPoint>) -> Self {
        let kind = AreaKind::from_tags(&tags);
        Self {
            id,
            tags,
            footprint,
            kind,
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// A tagged single point worth visiting in the generated level
#[derive(Debug, Clone)]
pub struct PointOfInterest {
    pub id: i64,
    pub tags: TagMap,
    pub position: GeoCoord,
    /// Human-readable category (the value of the tag that qualified it)
    pub category: String,
}

impl PointOfInterest {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// The fetched map data for one bounding box
///
/// Owns the reference frame (bounds plus the projection anchored at its
/// center) and the four feature collections. Read-only after parsing;
/// the resolver builds a fresh model per request.
#[derive(Debug, Clone)]
pub struct MapModel {
    bounds: BoundingBox,
    projection: LocalProjection,
    roads: Vec<Road>,
    buildings: Vec<Building>,
    areas: Vec<MapArea>,
    pois: Vec<PointOfInterest>,
}

impl MapModel {
    /// Assemble a model from parsed collections
    pub fn new(
        bounds: BoundingBox,
        roads: Vec<Road>,
        buildings: Vec<Building>,
        areas: Vec<MapArea>,
        pois: Vec<PointOfInterest>,
    ) -> Self {
        Self {
            bounds,
            projection: LocalProjection::for_bounds(&bounds),
            roads,
            buildings,
            areas,
            pois,
        }
    }

    /// An empty model for the given bounds
    pub fn empty(bounds: BoundingBox) -> Self {
        Self::new(bounds, Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn projection(&self) -> &LocalProjection {
        &self.projection
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn areas(&self) -> &[MapArea] {
        &self.areas
    }

    pub fn pois(&self) -> &[PointOfInterest] {
        &self.pois
    }

    /// Project a geographic coordinate into the model's world space
    pub fn project(&self, coord: &GeoCoord) -> Vec3 {
        self.projection.project(coord)
    }

    /// True when no features of any kind were parsed
    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
            && self.buildings.is_empty()
            && self.areas.is_empty()
            && self.pois.is_empty()
    }

    /// Total number of parsed features
    pub fn feature_count(&self) -> usize {
        self.roads.len() + self.buildings.len() + self.areas.len() + self.pois.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_height_from_explicit_tag() {
        let config = MapDataConfig::default();
        assert_eq!(derive_height(&tags(&[("height", "12")]), &config), 12.0);
        assert_eq!(derive_height(&tags(&[("height", "12.5 m")]), &config), 12.5);
    }

    #[test]
    fn test_height_from_levels() {
        let config = MapDataConfig::default();
        let h = derive_height(&tags(&[("building:levels", "4")]), &config);
        assert_eq!(h, 4.0 * config.per_level_height);
    }

    #[test]
    fn test_height_prefers_explicit_over_levels() {
        let config = MapDataConfig::default();
        let t = tags(&[("height", "20"), ("building:levels", "2")]);
        assert_eq!(derive_height(&t, &config), 20.0);
    }

    #[test]
    fn test_height_default_on_garbage() {
        let config = MapDataConfig::default();
        assert_eq!(
            derive_height(&tags(&[("height", "tall")]), &config),
            config.default_building_height
        );
        assert_eq!(
            derive_height(&tags(&[("building:levels", "many")]), &config),
            config.default_building_height
        );
        assert_eq!(derive_height(&tags(&[]), &config), config.default_building_height);
        // Non-positive values fall through to the default as well
        assert_eq!(
            derive_height(&tags(&[("height", "-3")]), &config),
            config.default_building_height
        );
    }

    #[test]
    fn test_road_class_lookup() {
        assert_eq!(RoadClass::from_highway("motorway"), RoadClass::Motorway);
        assert_eq!(RoadClass::from_highway("primary"), RoadClass::Primary);
        assert_eq!(RoadClass::from_highway("tertiary"), RoadClass::Secondary);
        assert_eq!(RoadClass::from_highway("residential"), RoadClass::Residential);
        assert_eq!(RoadClass::from_highway("footway"), RoadClass::Footway);
        assert_eq!(RoadClass::from_highway("bridleway"), RoadClass::Other);
    }

    #[test]
    fn test_road_widths_ordered() {
        assert!(RoadClass::Motorway.width_m() > RoadClass::Primary.width_m());
        assert!(RoadClass::Primary.width_m() > RoadClass::Residential.width_m());
        assert!(RoadClass::Residential.width_m() > RoadClass::Footway.width_m());
    }

    #[test]
    fn test_area_kind_lookup() {
        assert_eq!(AreaKind::from_tags(&tags(&[("leisure", "park")])), AreaKind::Park);
        assert_eq!(AreaKind::from_tags(&tags(&[("landuse", "forest")])), AreaKind::Park);
        assert_eq!(AreaKind::from_tags(&tags(&[("natural", "water")])), AreaKind::Water);
        assert_eq!(AreaKind::from_tags(&tags(&[("waterway", "riverbank")])), AreaKind::Water);
        assert_eq!(AreaKind::from_tags(&tags(&[("landuse", "industrial")])), AreaKind::Other);
        // Water wins over park-ish tags when both appear
        assert_eq!(
            AreaKind::from_tags(&tags(&[("natural", "water"), ("leisure", "park")])),
            AreaKind::Water
        );
    }

    #[test]
    fn test_model_accessors() {
        let bounds =
            BoundingBox::from_center_radius(GeoCoord::new(51.3397, 12.3731), 500.0).unwrap();
        let model = MapModel::empty(bounds);

        assert!(model.is_empty());
        assert_eq!(model.feature_count(), 0);

        let center_world = model.project(&bounds.center());
        assert!(center_world.length() < 1e-3);
    }
}
