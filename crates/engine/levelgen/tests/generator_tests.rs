//! Integration tests for the level generation pipeline
//!
//! These verify teardown-before-create, batch bounding, the
//! goal-and-spawn-last ordering, and the minimal-level fallback, using the
//! recording scene so ordering is asserted from the actual call log.

use std::sync::Arc;

use streetforge_geo::{BoundingBox, GeoCoord};
use streetforge_levelgen::{
    GeneratorConfig, GeneratorStatus, MapGenerator, MemoryScene, ObjectKind, SceneEvent,
};
use streetforge_mapdata::{
    Building, GeoPoint, MapArea, MapDataConfig, MapModel, PointOfInterest, Road, TagMap,
};

fn tags(pairs: &[(&str, &str)]) -> TagMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn bounds() -> BoundingBox {
    BoundingBox::from_center_radius(GeoCoord::new(51.3397, 12.3731), 500.0).unwrap()
}

/// A model with one road, one building, one park, and `poi_count` POIs
fn model_with_pois(poi_count: usize) -> Arc<MapModel> {
    let bounds = bounds();
    let center = bounds.center();
    let p = |dlat: f64, dlon: f64| {
        GeoPoint::new(0, GeoCoord::new(center.lat + dlat, center.lon + dlon))
    };

    let road = Road::new(
        1,
        tags(&[("highway", "residential")]),
        vec![p(-0.002, -0.002), p(0.0, 0.0), p(0.002, 0.002)],
    );
    let building = Building::new(
        2,
        tags(&[("building", "yes"), ("height", "12")]),
        vec![p(0.001, 0.001), p(0.0015, 0.001), p(0.001, 0.0015)],
        &MapDataConfig::default(),
    );
    let park = MapArea::new(
        3,
        tags(&[("leisure", "park")]),
        vec![p(-0.001, 0.001), p(-0.0015, 0.001), p(-0.001, 0.0015)],
    );
    let pois = (0..poi_count)
        .map(|i| PointOfInterest {
            id: 100 + i as i64,
            tags: tags(&[("amenity", "cafe")]),
            position: GeoCoord::new(center.lat, center.lon + 0.0001 * i as f64),
            category: "cafe".to_string(),
        })
        .collect();

    Arc::new(MapModel::new(
        bounds,
        vec![road],
        vec![building],
        vec![park],
        pois,
    ))
}

fn run_full(generator: &mut MapGenerator, scene: &mut MemoryScene) {
    while generator.step(scene) == GeneratorStatus::Running {}
}

#[test]
fn test_full_generation_counts() {
    let mut generator = MapGenerator::new(GeneratorConfig::default());
    let mut scene = MemoryScene::new();

    generator.generate(model_with_pois(2), &mut scene);
    run_full(&mut generator, &mut scene);

    assert!(generator.is_complete());
    assert_eq!(scene.count_of(ObjectKind::Ground), 1);
    // Three road points make two segments
    assert_eq!(scene.count_of(ObjectKind::Road), 2);
    assert_eq!(scene.count_of(ObjectKind::Building), 1);
    assert_eq!(scene.count_of(ObjectKind::Area), 1);
    assert_eq!(scene.count_of(ObjectKind::Collectible), 2);
    assert_eq!(scene.count_of(ObjectKind::GoalZone), 1);
    assert_eq!(scene.count_of(ObjectKind::SpawnPoint), 1);
    assert_eq!(generator.object_count(), scene.alive_count());
}

#[test]
fn test_goal_and_spawn_are_last() {
    let mut generator = MapGenerator::new(GeneratorConfig::default());
    let mut scene = MemoryScene::new();

    generator.generate(model_with_pois(3), &mut scene);
    run_full(&mut generator, &mut scene);

    let spawn_kinds: Vec<ObjectKind> = scene
        .events()
        .iter()
        .filter_map(|e| match e {
            SceneEvent::Spawned(_, kind) => Some(*kind),
            SceneEvent::Despawned(_) => None,
        })
        .collect();

    let last_two = &spawn_kinds[spawn_kinds.len() - 2..];
    assert_eq!(last_two, &[ObjectKind::GoalZone, ObjectKind::SpawnPoint]);
}

#[test]
fn test_generation_is_idempotent() {
    let mut generator = MapGenerator::new(GeneratorConfig::default());
    let mut scene = MemoryScene::new();
    let model = model_with_pois(2);

    generator.generate(model.clone(), &mut scene);
    run_full(&mut generator, &mut scene);
    let first: Vec<ObjectKind> = scene.alive_kinds();

    generator.generate(model, &mut scene);
    run_full(&mut generator, &mut scene);
    let second: Vec<ObjectKind> = scene.alive_kinds();

    assert_eq!(first, second);
}

#[test]
fn test_teardown_completes_before_new_objects() {
    let mut generator = MapGenerator::new(GeneratorConfig::default());
    let mut scene = MemoryScene::new();

    generator.generate(model_with_pois(1), &mut scene);
    run_full(&mut generator, &mut scene);
    let first_count = scene.alive_count();
    assert!(first_count > 0);

    generator.generate(model_with_pois(4), &mut scene);
    run_full(&mut generator, &mut scene);

    // Every object of the first generation was despawned, and all those
    // despawns happened before the second generation's first spawn.
    let events = scene.events();
    let despawns: Vec<usize> = events
        .iter()
        .enumerate()
        .filter_map(|(i, e)| matches!(e, SceneEvent::Despawned(_)).then_some(i))
        .collect();
    assert_eq!(despawns.len(), first_count);

    let respawn_start = despawns.iter().max().unwrap();
    let stale_spawns = events[..*respawn_start]
        .iter()
        .skip(first_count) // the first generation's own spawns
        .filter(|e| matches!(e, SceneEvent::Spawned(..)))
        .count();
    assert_eq!(stale_spawns, 0);

    // Only the second generation remains visible
    assert_eq!(scene.alive_count(), generator.object_count());
    assert_eq!(scene.count_of(ObjectKind::Collectible), 4);
}

#[test]
fn test_new_generate_cancels_in_flight_batches() {
    let config = GeneratorConfig::default().with_batch_size(2);
    let mut generator = MapGenerator::new(config);
    let mut scene = MemoryScene::new();

    generator.generate(model_with_pois(2), &mut scene);
    // Only part of the first model's units run before the second request
    assert_eq!(generator.step(&mut scene), GeneratorStatus::Running);
    let partial = scene.alive_count();
    assert!(partial > 0);

    generator.generate(model_with_pois(1), &mut scene);
    run_full(&mut generator, &mut scene);

    // Nothing from the first request survived, and no stale unit executed
    // after the second generate call
    assert_eq!(scene.alive_count(), generator.object_count());
    assert_eq!(scene.count_of(ObjectKind::Collectible), 1);
    assert_eq!(scene.count_of(ObjectKind::GoalZone), 1);
}

#[test]
fn test_batch_size_bounds_each_step() {
    let config = GeneratorConfig::default().with_batch_size(3);
    let mut generator = MapGenerator::new(config);
    let mut scene = MemoryScene::new();

    generator.generate(model_with_pois(8), &mut scene);

    let before = generator.pending_units();
    generator.step(&mut scene);
    assert_eq!(before - generator.pending_units(), 3);
    assert_eq!(generator.status(), GeneratorStatus::Running);
}

#[test]
fn test_empty_model_yields_minimal_level() {
    let mut generator = MapGenerator::new(GeneratorConfig::default());
    let mut scene = MemoryScene::new();

    let empty = Arc::new(MapModel::empty(bounds()));
    generator.generate(empty, &mut scene);
    run_full(&mut generator, &mut scene);

    assert!(generator.is_complete());
    assert_eq!(scene.count_of(ObjectKind::Ground), 1);
    assert_eq!(scene.count_of(ObjectKind::GoalZone), 1);
    assert_eq!(scene.count_of(ObjectKind::SpawnPoint), 1);
    assert!(scene.count_of(ObjectKind::Collectible) >= 1);
}

#[test]
fn test_collectible_cap_applies() {
    let config = GeneratorConfig::default().with_max_collectibles(5);
    let mut generator = MapGenerator::new(config);
    let mut scene = MemoryScene::new();

    generator.generate(model_with_pois(20), &mut scene);
    run_full(&mut generator, &mut scene);

    assert_eq!(scene.count_of(ObjectKind::Collectible), 5);
}

#[test]
fn test_zero_length_road_segment_skipped() {
    let bounds = bounds();
    let center = bounds.center();
    let point = GeoPoint::new(0, center);
    // Two coincident points: one segment, zero length
    let road = Road::new(1, tags(&[("highway", "residential")]), vec![point.clone(), point]);
    let model = Arc::new(MapModel::new(bounds, vec![road], vec![], vec![], vec![]));

    let mut generator = MapGenerator::new(GeneratorConfig::default());
    let mut scene = MemoryScene::new();
    generator.generate(model, &mut scene);
    run_full(&mut generator, &mut scene);

    assert_eq!(scene.count_of(ObjectKind::Road), 0);
    assert!(generator.is_complete());
}

#[test]
fn test_regenerate_without_model_is_minimal() {
    let mut generator = MapGenerator::new(GeneratorConfig::default());
    let mut scene = MemoryScene::new();

    generator.regenerate(&mut scene);
    run_full(&mut generator, &mut scene);

    assert_eq!(scene.count_of(ObjectKind::Ground), 1);
    assert_eq!(scene.count_of(ObjectKind::GoalZone), 1);
    assert_eq!(scene.count_of(ObjectKind::SpawnPoint), 1);
    assert!(scene.count_of(ObjectKind::Collectible) >= 1);
}

#[tokio::test]
async fn test_run_to_completion_drains_everything() {
    let mut generator = MapGenerator::new(GeneratorConfig::default().with_batch_size(1));
    let mut scene = MemoryScene::new();

    generator.generate(model_with_pois(3), &mut scene);
    let status = generator.run_to_completion(&mut scene).await;

    assert_eq!(status, GeneratorStatus::Complete);
    assert_eq!(generator.pending_units(), 0);
    assert!(scene.alive_count() > 0);
}
