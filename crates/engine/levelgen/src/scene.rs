//! The scene collaborator interface
//!
//! The generator depends only on this capability set: instantiate and
//! destroy typed objects at local positions. What a scene does with the
//! calls (meshes, colliders, log lines) is its own business, so the
//! pipeline stays independent of any concrete rendering technology.

use glam::Vec3;

use streetforge_mapdata::AreaKind;

/// Opaque handle to an object living in a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneId(pub u64);

/// What kind of object a scene call created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Ground,
    Road,
    Building,
    Area,
    Collectible,
    GoalZone,
    SpawnPoint,
}

/// Interface the generator writes world objects through
///
/// All positions and dimensions are in local world space (meters), as
/// produced by the model's projection.
pub trait LevelScene {
    /// A flat ground square centered on the origin
    fn spawn_ground(&mut self, half_extent: f32) -> SceneId;

    /// One straight road strip: centered at `center`, `length` along the
    /// heading given by `yaw` (radians from +Z), `width` across
    fn spawn_road_segment(&mut self, center: Vec3, length: f32, width: f32, yaw: f32) -> SceneId;

    /// A building volume: footprint polygon extruded up by `height`
    fn spawn_building(&mut self, footprint: &[Vec3], height: f32) -> SceneId;

    /// A flat region filling the footprint, styled by its kind
    fn spawn_area(&mut self, footprint: &[Vec3], kind: AreaKind) -> SceneId;

    fn spawn_collectible(&mut self, position: Vec3) -> SceneId;

    fn spawn_goal_zone(&mut self, position: Vec3) -> SceneId;

    fn spawn_spawn_point(&mut self, position: Vec3) -> SceneId;

    /// Remove a previously spawned object
    fn despawn(&mut self, id: SceneId);
}

/// One recorded scene mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    Spawned(SceneId, ObjectKind),
    Despawned(SceneId),
}

/// In-memory scene that records every call
///
/// Backs headless runs and tests; the event log preserves ordering so
/// teardown-before-create and goal-zone-last can be asserted, not assumed.
#[derive(Debug, Default)]
pub struct MemoryScene {
    next_id: u64,
    alive: std::collections::BTreeMap<SceneId, ObjectKind>,
    events: Vec<SceneEvent>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn(&mut self, kind: ObjectKind) -> SceneId {
        self.next_id += 1;
        let id = SceneId(self.next_id);
        self.alive.insert(id, kind);
        self.events.push(SceneEvent::Spawned(id, kind));
        id
    }

    /// Number of objects currently alive
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Number of alive objects of one kind
    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.alive.values().filter(|k| **k == kind).count()
    }

    /// Full mutation log in call order
    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    /// Kinds of alive objects, in spawn order
    pub fn alive_kinds(&self) -> Vec<ObjectKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SceneEvent::Spawned(id, kind) if self.alive.contains_key(id) => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

impl LevelScene for MemoryScene {
    fn spawn_ground(&mut self, _half_extent: f32) -> SceneId {
        self.spawn(ObjectKind::Ground)
    }

    fn spawn_road_segment(&mut self, _center: Vec3, _length: f32, _width: f32, _yaw: f32) -> SceneId {
        self.spawn(ObjectKind::Road)
    }

    fn spawn_building(&mut self, _footprint: &[Vec3], _height: f32) -> SceneId {
        self.spawn(ObjectKind::Building)
    }

    fn spawn_area(&mut self, _footprint: &[Vec3], _kind: AreaKind) -> SceneId {
        self.spawn(ObjectKind::Area)
    }

    fn spawn_collectible(&mut self, _position: Vec3) -> SceneId {
        self.spawn(ObjectKind::Collectible)
    }

    fn spawn_goal_zone(&mut self, _position: Vec3) -> SceneId {
        self.spawn(ObjectKind::GoalZone)
    }

    fn spawn_spawn_point(&mut self, _position: Vec3) -> SceneId {
        self.spawn(ObjectKind::SpawnPoint)
    }

    fn despawn(&mut self, id: SceneId) {
        self.alive.remove(&id);
        self.events.push(SceneEvent::Despawned(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_scene_records_lifecycle() {
        let mut scene = MemoryScene::new();

        let a = scene.spawn_collectible(Vec3::ZERO);
        let b = scene.spawn_goal_zone(Vec3::ONE);
        assert_eq!(scene.alive_count(), 2);
        assert_eq!(scene.count_of(ObjectKind::Collectible), 1);

        scene.despawn(a);
        assert_eq!(scene.alive_count(), 1);
        assert_eq!(scene.count_of(ObjectKind::Collectible), 0);
        assert_eq!(scene.alive_kinds(), vec![ObjectKind::GoalZone]);

        assert_eq!(
            scene.events(),
            &[
                SceneEvent::Spawned(a, ObjectKind::Collectible),
                SceneEvent::Spawned(b, ObjectKind::GoalZone),
                SceneEvent::Despawned(a),
            ]
        );
    }
}
