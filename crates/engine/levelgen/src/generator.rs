//! The incremental map generator
//!
//! Object creation is queued as work units and drained in bounded batches
//! by [`MapGenerator::step`], so the host loop keeps its frame budget.
//! A new generation clears pending units (cancellation), tears the old
//! objects down, and only then enqueues new work; the goal zone and spawn
//! point are always the final unit so their placement can depend on
//! everything generated before them.

use std::collections::VecDeque;
use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, info, warn};

use streetforge_mapdata::MapModel;

use crate::scene::{LevelScene, SceneId};

/// Tunable generation constants
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Work units processed per [`MapGenerator::step`] call
    pub batch_size: usize,
    /// Upper bound on spawned collectibles, to bound generation cost
    pub max_collectibles: usize,
    /// Road segments shorter than this are skipped as degenerate
    pub min_segment_length: f32,
    /// Height above ground at which collectibles float
    pub collectible_height: f32,
    /// Pull-in distance from the bounding-box corner to the goal zone
    pub goal_margin: f32,
    /// Extra ground extent beyond the map bounds
    pub ground_padding: f32,
    /// Level half-size when generating without any model
    pub fallback_extent: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 16,
            max_collectibles: 64,
            min_segment_length: 0.5,
            collectible_height: 1.0,
            goal_margin: 10.0,
            ground_padding: 20.0,
            fallback_extent: 50.0,
        }
    }
}

impl GeneratorConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_collectibles(mut self, max_collectibles: usize) -> Self {
        self.max_collectibles = max_collectibles;
        self
    }

    pub fn with_goal_margin(mut self, goal_margin: f32) -> Self {
        self.goal_margin = goal_margin;
        self
    }
}

/// One queued unit of generation work
///
/// Feature units index into the model instead of owning copies; the model
/// is immutable for the generator's lifetime, so the indices stay good.
enum WorkUnit {
    Ground,
    Road(usize),
    Building(usize),
    Area(usize),
    CollectibleAt(Vec3),
    Finalize,
}

/// Where the generator currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorStatus {
    /// Nothing has been generated yet
    Idle,
    /// Work units are pending
    Running,
    /// The last generation finished
    Complete,
}

/// Materializes a map model into scene objects, batch by batch
pub struct MapGenerator {
    config: GeneratorConfig,
    model: Option<Arc<MapModel>>,
    queue: VecDeque<WorkUnit>,
    spawned: Vec<SceneId>,
    started: bool,
}

impl MapGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            model: None,
            queue: VecDeque::new(),
            spawned: Vec::new(),
            started: false,
        }
    }

    /// Begin generating a model, replacing whatever came before
    ///
    /// Pending units from a previous call are cancelled first, then every
    /// previously spawned object is despawned, and only then is new work
    /// enqueued. Call [`MapGenerator::step`] (or
    /// [`MapGenerator::run_to_completion`]) to execute it.
    pub fn generate(&mut self, model: Arc<MapModel>, scene: &mut dyn LevelScene) {
        // A stale unit must never write into the scene once teardown has
        // begun, so cancellation comes first.
        self.queue.clear();
        self.teardown(scene);
        self.model = Some(model);
        self.enqueue_units();
        self.started = true;
    }

    /// Re-run generation with the last model
    ///
    /// Without a model this still produces the minimal playable level.
    pub fn regenerate(&mut self, scene: &mut dyn LevelScene) {
        match self.model.clone() {
            Some(model) => self.generate(model, scene),
            None => {
                warn!("regenerate without a model, building minimal level");
                self.queue.clear();
                self.teardown(scene);
                self.enqueue_units();
                self.started = true;
            }
        }
    }

    /// Drop all pending work, keeping what was already spawned
    pub fn cancel(&mut self) {
        self.queue.clear();
    }

    /// Execute one bounded batch of work units
    pub fn step(&mut self, scene: &mut dyn LevelScene) -> GeneratorStatus {
        for _ in 0..self.config.batch_size.max(1) {
            let Some(unit) = self.queue.pop_front() else {
                break;
            };
            self.run_unit(unit, scene);
        }
        self.status()
    }

    /// Drive generation to completion, yielding to the runtime between
    /// batches so other tasks keep running
    pub async fn run_to_completion(&mut self, scene: &mut dyn LevelScene) -> GeneratorStatus {
        while self.step(scene) == GeneratorStatus::Running {
            tokio::task::yield_now().await;
        }
        self.status()
    }

    pub fn status(&self) -> GeneratorStatus {
        if !self.queue.is_empty() {
            GeneratorStatus::Running
        } else if self.started {
            GeneratorStatus::Complete
        } else {
            GeneratorStatus::Idle
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == GeneratorStatus::Complete
    }

    /// Number of objects currently spawned by this generator
    pub fn object_count(&self) -> usize {
        self.spawned.len()
    }

    /// Number of work units not yet executed
    pub fn pending_units(&self) -> usize {
        self.queue.len()
    }

    fn teardown(&mut self, scene: &mut dyn LevelScene) {
        if !self.spawned.is_empty() {
            debug!(count = self.spawned.len(), "tearing down previous level");
        }
        for id in self.spawned.drain(..) {
            scene.despawn(id);
        }
    }

    fn enqueue_units(&mut self) {
        self.queue.push_back(WorkUnit::Ground);

        let Some(model) = self.model.clone() else {
            info!("no map model, generating minimal fallback level");
            self.queue
                .push_back(WorkUnit::CollectibleAt(self.placeholder_collectible()));
            self.queue.push_back(WorkUnit::Finalize);
            return;
        };

        if model.roads().is_empty() && model.buildings().is_empty() && model.areas().is_empty() {
            info!("map model has no geometry, level will be minimal");
        }

        for index in 0..model.roads().len() {
            self.queue.push_back(WorkUnit::Road(index));
        }
        for index in 0..model.buildings().len() {
            self.queue.push_back(WorkUnit::Building(index));
        }
        for index in 0..model.areas().len() {
            self.queue.push_back(WorkUnit::Area(index));
        }

        let mut collectibles = 0;
        for poi in model.pois().iter().take(self.config.max_collectibles) {
            let position = model.project(&poi.position)
                + Vec3::new(0.0, self.config.collectible_height, 0.0);
            self.queue.push_back(WorkUnit::CollectibleAt(position));
            collectibles += 1;
        }
        if model.pois().len() > self.config.max_collectibles {
            debug!(
                dropped = model.pois().len() - self.config.max_collectibles,
                "collectible cap applied"
            );
        }
        // A level with nothing to pick up is not playable
        if collectibles == 0 {
            self.queue
                .push_back(WorkUnit::CollectibleAt(self.placeholder_collectible()));
        }

        // Always last: goal and spawn placement may depend on the full
        // extent of what was generated
        self.queue.push_back(WorkUnit::Finalize);
    }

    fn run_unit(&mut self, unit: WorkUnit, scene: &mut dyn LevelScene) {
        match unit {
            WorkUnit::Ground => {
                let id = scene.spawn_ground(self.ground_half_extent());
                self.spawned.push(id);
            }
            WorkUnit::Road(index) => self.build_road(index, scene),
            WorkUnit::Building(index) => self.build_building(index, scene),
            WorkUnit::Area(index) => self.build_area(index, scene),
            WorkUnit::CollectibleAt(position) => {
                let id = scene.spawn_collectible(position);
                self.spawned.push(id);
            }
            WorkUnit::Finalize => {
                let goal = scene.spawn_goal_zone(self.goal_position());
                self.spawned.push(goal);
                let spawn = scene.spawn_spawn_point(Vec3::ZERO);
                self.spawned.push(spawn);
            }
        }
    }

    fn build_road(&mut self, index: usize, scene: &mut dyn LevelScene) {
        let Some(model) = self.model.clone() else {
            return;
        };
        let Some(road) = model.roads().get(index) else {
            return;
        };

        let width = road.class.width_m();
        let points: Vec<Vec3> = road
            .points
            .iter()
            .map(|p| model.project(&p.coord))
            .collect();

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let delta = b - a;
            let length = (delta.x * delta.x + delta.z * delta.z).sqrt();
            if length < self.config.min_segment_length {
                debug!(id = road.id, "skipping degenerate road segment");
                continue;
            }
            let yaw = delta.x.atan2(delta.z);
            let id = scene.spawn_road_segment((a + b) / 2.0, length, width, yaw);
            self.spawned.push(id);
        }
    }

    fn build_building(&mut self, index: usize, scene: &mut dyn LevelScene) {
        let Some(model) = self.model.clone() else {
            return;
        };
        let Some(building) = model.buildings().get(index) else {
            return;
        };

        let footprint: Vec<Vec3> = building
            .footprint
            .iter()
            .map(|p| model.project(&p.coord))
            .collect();

        // The parser enforces both invariants; re-checked because a bad
        // scene call is much harder to diagnose than a skipped building.
        if footprint.len() < 3 || building.height <= 0.0 {
            warn!(id = building.id, "degenerate building reached generator, skipping");
            return;
        }

        let id = scene.spawn_building(&footprint, building.height);
        self.spawned.push(id);
    }

    fn build_area(&mut self, index: usize, scene: &mut dyn LevelScene) {
        let Some(model) = self.model.clone() else {
            return;
        };
        let Some(area) = model.areas().get(index) else {
            return;
        };

        let footprint: Vec<Vec3> = area
            .footprint
            .iter()
            .map(|p| model.project(&p.coord))
            .collect();
        if footprint.len() < 3 {
            warn!(id = area.id, "degenerate area reached generator, skipping");
            return;
        }

        let id = scene.spawn_area(&footprint, area.kind);
        self.spawned.push(id);
    }

    fn ground_half_extent(&self) -> f32 {
        match &self.model {
            Some(model) => {
                let bounds = model.bounds();
                (bounds.width_m().max(bounds.height_m()) as f32) / 2.0 + self.config.ground_padding
            }
            None => self.config.fallback_extent,
        }
    }

    /// Far corner of the bounds, pulled inward by the margin
    fn goal_position(&self) -> Vec3 {
        let margin = self.config.goal_margin;
        match &self.model {
            Some(model) => {
                let corner = model.project(&model.bounds().max);
                Vec3::new(corner.x - margin, 0.0, corner.z - margin)
            }
            None => {
                let extent = self.config.fallback_extent;
                Vec3::new(extent - margin, 0.0, extent - margin)
            }
        }
    }

    fn placeholder_collectible(&self) -> Vec3 {
        Vec3::new(0.0, self.config.collectible_height, 5.0)
    }
}
