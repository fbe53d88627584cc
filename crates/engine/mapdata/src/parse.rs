//! Defensive parsing of the map-data service's JSON response
//!
//! The Overpass payload is loosely structured: elements may be missing
//! coordinates, carry non-numeric tags, or have too few vertices to form
//! the shape their tags claim. Any such element is dropped with a logged
//! warning; parsing itself never fails, it only reduces feature counts.

use serde_json::Value;
use tracing::{info, warn};

use streetforge_geo::{BoundingBox, GeoCoord};

use crate::model::{
    Building, GeoPoint, MapArea, MapDataConfig, MapModel, PointOfInterest, Road, TagMap,
};

/// Tag keys whose presence turns a node into a point of interest
const POI_KEYS: &[&str] = &["amenity", "shop", "tourism", "historic", "leisure"];

/// Tag keys that mark a closed way as a land-use area
const AREA_KEYS: &[&str] = &["leisure", "landuse", "natural", "waterway"];

/// Counters describing one parse pass
///
/// `dropped` counts malformed elements that were skipped; `ignored` counts
/// well-formed elements the pipeline has no use for (untagged nodes,
/// relation stubs, ways with tags outside the gameplay subset).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub roads: usize,
    pub buildings: usize,
    pub areas: usize,
    pub pois: usize,
    pub dropped: usize,
    pub ignored: usize,
}

impl ParseStats {
    /// Total number of features that made it into the model
    pub fn kept(&self) -> usize {
        self.roads + self.buildings + self.areas + self.pois
    }
}

impl MapModel {
    /// Parse an Overpass JSON document into a model
    ///
    /// Never fails: a document without a usable `elements` array simply
    /// yields an empty model, and each malformed element is skipped and
    /// logged individually.
    pub fn from_overpass(bounds: BoundingBox, doc: &Value, config: &MapDataConfig) -> MapModel {
        let (model, stats) = parse_overpass(bounds, doc, config);
        info!(
            roads = stats.roads,
            buildings = stats.buildings,
            areas = stats.areas,
            pois = stats.pois,
            dropped = stats.dropped,
            "parsed map data"
        );
        model
    }
}

/// Parse an Overpass JSON document, returning the model and its counters
pub fn parse_overpass(
    bounds: BoundingBox,
    doc: &Value,
    config: &MapDataConfig,
) -> (MapModel, ParseStats) {
    let mut stats = ParseStats::default();
    let mut roads = Vec::new();
    let mut buildings = Vec::new();
    let mut areas = Vec::new();
    let mut pois = Vec::new();

    let Some(elements) = doc.get("elements").and_then(Value::as_array) else {
        warn!("map data response has no elements array");
        return (MapModel::empty(bounds), stats);
    };

    for element in elements {
        match element.get("type").and_then(Value::as_str) {
            Some("way") => match parse_way(element, config) {
                Some(ParsedWay::Road(road)) => {
                    stats.roads += 1;
                    roads.push(road);
                }
                Some(ParsedWay::Building(building)) => {
                    stats.buildings += 1;
                    buildings.push(building);
                }
                Some(ParsedWay::Area(area)) => {
                    stats.areas += 1;
                    areas.push(area);
                }
                Some(ParsedWay::Ignored) => stats.ignored += 1,
                None => stats.dropped += 1,
            },
            Some("node") => match parse_node(element) {
                Some(ParsedNode::Poi(poi)) => {
                    stats.pois += 1;
                    pois.push(poi);
                }
                Some(ParsedNode::Ignored) => stats.ignored += 1,
                None => stats.dropped += 1,
            },
            // Relations are outside the gameplay subset
            Some(_) | None => stats.ignored += 1,
        }
    }

    (MapModel::new(bounds, roads, buildings, areas, pois), stats)
}

enum ParsedWay {
    Road(Road),
    Building(Building),
    Area(MapArea),
    Ignored,
}

enum ParsedNode {
    Poi(PointOfInterest),
    Ignored,
}

/// Parse one way element, classifying it by tags
///
/// Classification priority: building, then highway, then land-use area.
/// Returns `None` when the element is malformed (no id, no usable
/// geometry, too few vertices for its shape).
fn parse_way(element: &Value, config: &MapDataConfig) -> Option<ParsedWay> {
    let id = match element.get("id").and_then(Value::as_i64) {
        Some(id) => id,
        None => {
            warn!("way element without id, skipping");
            return None;
        }
    };

    let tags = collect_tags(element);
    let points = parse_geometry(element, id);

    if tags.get("building").map(String::as_str).unwrap_or("no") != "no" {
        if points.len() < 3 {
            warn!(id, vertices = points.len(), "building footprint too small, skipping");
            return None;
        }
        return Some(ParsedWay::Building(Building::new(id, tags, points, config)));
    }

    if tags.contains_key("highway") {
        if points.len() < 2 {
            warn!(id, vertices = points.len(), "road with fewer than 2 vertices, skipping");
            return None;
        }
        return Some(ParsedWay::Road(Road::new(id, tags, points)));
    }

    if AREA_KEYS.iter().any(|k| tags.contains_key(*k)) {
        if points.len() < 3 {
            warn!(id, vertices = points.len(), "area footprint too small, skipping");
            return None;
        }
        return Some(ParsedWay::Area(MapArea::new(id, tags, points)));
    }

    Some(ParsedWay::Ignored)
}

/// Parse one node element into a point of interest
///
/// Nodes without a qualifying category tag are ignored; nodes with
/// missing or invalid coordinates are dropped.
fn parse_node(element: &Value) -> Option<ParsedNode> {
    let tags = collect_tags(element);
    let Some(category) = POI_KEYS.iter().find_map(|k| tags.get(*k).cloned()) else {
        return Some(ParsedNode::Ignored);
    };

    let id = match element.get("id").and_then(Value::as_i64) {
        Some(id) => id,
        None => {
            warn!("node element without id, skipping");
            return None;
        }
    };

    let lat = element.get("lat").and_then(Value::as_f64);
    let lon = element.get("lon").and_then(Value::as_f64);
    let position = match (lat, lon) {
        (Some(lat), Some(lon)) => GeoCoord::new(lat, lon),
        _ => {
            warn!(id, "node without coordinates, skipping");
            return None;
        }
    };
    if !position.is_valid() {
        warn!(id, %position, "node with out-of-range coordinates, skipping");
        return None;
    }

    Some(ParsedNode::Poi(PointOfInterest {
        id,
        tags,
        position,
        category,
    }))
}

/// Collect the element's tag object into a map, keeping string values only
fn collect_tags(element: &Value) -> TagMap {
    element
        .get("tags")
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Extract a way's inline geometry, pairing vertex ids where available
///
/// Vertices with missing or invalid coordinates are dropped individually;
/// the caller decides whether enough survive for the way's shape.
fn parse_geometry(element: &Value, way_id: i64) -> Vec<GeoPoint> {
    let node_ids: Vec<Option<i64>> = element
        .get("nodes")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().map(Value::as_i64).collect())
        .unwrap_or_default();

    let Some(geometry) = element.get("geometry").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut points = Vec::with_capacity(geometry.len());
    for (index, vertex) in geometry.iter().enumerate() {
        let lat = vertex.get("lat").and_then(Value::as_f64);
        let lon = vertex.get("lon").and_then(Value::as_f64);
        let coord = match (lat, lon) {
            (Some(lat), Some(lon)) => GeoCoord::new(lat, lon),
            _ => {
                warn!(way_id, index, "vertex without coordinates, dropping");
                continue;
            }
        };
        if !coord.is_valid() {
            warn!(way_id, index, %coord, "vertex out of range, dropping");
            continue;
        }
        let id = node_ids.get(index).copied().flatten().unwrap_or(0);
        points.push(GeoPoint::new(id, coord));
    }
    points
}
