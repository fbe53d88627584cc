use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use glam::Vec3;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use streetforge_geo::GeoCoord;
use streetforge_levelgen::{GeneratorConfig, LevelScene, MapGenerator, SceneId};
use streetforge_mapdata::AreaKind;
use streetforge_resolver::{
    build_http_client, AddressResolver, NominatimGeocoder, OverpassClient, ResolverConfig,
};

/// Known-good location used when geocoding fails: Leipzig, Markt
const FALLBACK: GeoCoord = GeoCoord {
    lat: 51.3397,
    lon: 12.3731,
};

/// Turn a real-world address into a playable level
#[derive(Debug, Parser)]
#[command(name = "streetforge", version, about)]
struct Args {
    /// Free-text address to resolve (e.g. "Leipzig, Markt")
    address: String,

    /// Fetch radius around the geocoded point, in meters
    #[arg(long)]
    radius: Option<f64>,

    /// Upper bound on placed collectibles
    #[arg(long)]
    max_collectibles: Option<usize>,
}

/// Headless scene: logs each spawned object and tallies by kind
#[derive(Default)]
struct ConsoleScene {
    next_id: u64,
    counts: BTreeMap<&'static str, usize>,
}

impl ConsoleScene {
    fn record(&mut self, kind: &'static str) -> SceneId {
        self.next_id += 1;
        *self.counts.entry(kind).or_insert(0) += 1;
        SceneId(self.next_id)
    }
}

impl LevelScene for ConsoleScene {
    fn spawn_ground(&mut self, half_extent: f32) -> SceneId {
        debug!(half_extent, "ground");
        self.record("ground")
    }

    fn spawn_road_segment(&mut self, center: Vec3, length: f32, width: f32, yaw: f32) -> SceneId {
        debug!(?center, length, width, yaw, "road segment");
        self.record("road segment")
    }

    fn spawn_building(&mut self, footprint: &[Vec3], height: f32) -> SceneId {
        debug!(vertices = footprint.len(), height, "building");
        self.record("building")
    }

    fn spawn_area(&mut self, footprint: &[Vec3], kind: AreaKind) -> SceneId {
        debug!(vertices = footprint.len(), ?kind, "area");
        self.record("area")
    }

    fn spawn_collectible(&mut self, position: Vec3) -> SceneId {
        debug!(?position, "collectible");
        self.record("collectible")
    }

    fn spawn_goal_zone(&mut self, position: Vec3) -> SceneId {
        debug!(?position, "goal zone");
        self.record("goal zone")
    }

    fn spawn_spawn_point(&mut self, position: Vec3) -> SceneId {
        debug!(?position, "spawn point");
        self.record("spawn point")
    }

    fn despawn(&mut self, _id: SceneId) {}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = ResolverConfig::from_env().with_fallback(FALLBACK);
    if let Some(radius) = args.radius {
        config = config.with_radius_m(radius);
    }

    let client = build_http_client().context("failed to build HTTP client")?;
    let geocoder = NominatimGeocoder::new(client.clone(), config.geocoder_url.clone());
    let overpass =
        OverpassClient::new(client, config.overpass_url.clone()).with_timeout(config.timeout);
    let resolver = AddressResolver::new(geocoder, overpass, config);

    let model = resolver
        .resolve(&args.address)
        .await
        .with_context(|| format!("could not resolve \"{}\"", args.address))?;

    let bounds = *model.bounds();
    println!("Resolved \"{}\"", args.address);
    println!(
        "  center {}  extent {:.0} m x {:.0} m",
        bounds.center(),
        bounds.width_m(),
        bounds.height_m()
    );
    println!(
        "  features: {} roads, {} buildings, {} areas, {} POIs",
        model.roads().len(),
        model.buildings().len(),
        model.areas().len(),
        model.pois().len()
    );

    let mut gen_config = GeneratorConfig::default();
    if let Some(max) = args.max_collectibles {
        gen_config = gen_config.with_max_collectibles(max);
    }

    let mut generator = MapGenerator::new(gen_config);
    let mut scene = ConsoleScene::default();
    generator.generate(Arc::new(model), &mut scene);
    generator.run_to_completion(&mut scene).await;

    println!("Generated {} objects:", generator.object_count());
    for (kind, count) in &scene.counts {
        println!("  {count:>5}  {kind}");
    }

    Ok(())
}
