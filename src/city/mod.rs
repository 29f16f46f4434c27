//! The endless falling city.
//!
//! [`CitySystem`] owns the config, the chunk layout, the debris ideal set, the
//! live world and the animation state. All mutation of the rendering backend
//! goes through it, one call at a time, so ticks, edits and regeneration
//! never interleave.

pub mod animation;
pub mod config;
pub mod control;
pub mod debris;
pub mod layout;
pub mod world;

pub use animation::{AnimationLoop, TickReport};
pub use config::{CameraConfig, CityConfig, Color, Palette};
pub use control::ControlEdit;
pub use debris::{DebrisFieldGenerator, DebrisSpec};
pub use layout::{BuildingSpec, ChunkLayout};
pub use world::{DebrisInstance, World};

use rand::Rng;

use crate::atmosphere::AtmosphereSystem;
use crate::core::camera::Camera;
use crate::core::types::Result;
use crate::scene::RenderBackend;

pub struct CitySystem {
    config: CityConfig,
    layout: ChunkLayout,
    generator: DebrisFieldGenerator,
    ideal_set: Vec<DebrisSpec>,
    world: World,
    animation: AnimationLoop,
    atmosphere: AtmosphereSystem,
}

impl CitySystem {
    /// Validate `config`, generate the first ideal set and build every chunk.
    pub fn new(config: CityConfig, backend: &mut impl RenderBackend) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        log::info!("Debris seed: {seed}");
        warn_if_fog_outruns_city(&config);

        let layout = ChunkLayout::falling_city(&config);
        let mut generator = DebrisFieldGenerator::new(seed);
        let ideal_set = generator.generate(&config);
        let world = world::instantiate(&config, &layout, &ideal_set, backend);
        let animation = AnimationLoop::new(&config);
        let atmosphere = AtmosphereSystem::new(&config);

        Ok(Self {
            config,
            layout,
            generator,
            ideal_set,
            world,
            animation,
            atmosphere,
        })
    }

    /// Advance the camera and every debris piece by `ticks` ticks.
    pub fn tick(&mut self, ticks: u32, backend: &mut impl RenderBackend) -> TickReport {
        self.animation
            .tick(&self.config, ticks, &mut self.world.debris, backend)
    }

    /// Validate and commit one edit. On error nothing changes.
    pub fn apply_edit(&mut self, edit: ControlEdit, backend: &mut impl RenderBackend) -> Result<()> {
        self.config = edit.applied_to(&self.config)?;
        log::debug!("Applied edit: {edit}");

        if self.atmosphere.sync(&self.config) && matches!(edit, ControlEdit::FogDistance(_)) {
            warn_if_fog_outruns_city(&self.config);
        }
        if edit.needs_regeneration() {
            self.regenerate_debris(backend);
        }
        backend.request_redraw();
        Ok(())
    }

    /// Replace every debris piece with a fresh ideal set of the current size.
    ///
    /// All previous handles are released before any new one is created, so
    /// the debris collection never mixes old and new pieces.
    pub fn regenerate_debris(&mut self, backend: &mut impl RenderBackend) {
        let released = self.world.debris.len();
        self.world.release_debris(backend);

        self.ideal_set = self.generator.generate(&self.config);
        self.world.debris = world::instantiate_debris(&self.config, &self.ideal_set, backend);

        log::info!(
            "Regenerated debris: {} -> {} pieces ({} per chunk, seed {})",
            released,
            self.world.debris.len(),
            self.ideal_set.len(),
            self.generator.seed()
        );
    }

    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    pub fn layout(&self) -> &ChunkLayout {
        &self.layout
    }

    pub fn ideal_set(&self) -> &[DebrisSpec] {
        &self.ideal_set
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn animation(&self) -> &AnimationLoop {
        &self.animation
    }

    pub fn camera(&self) -> &Camera {
        self.animation.camera()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        self.animation.camera_mut()
    }

    pub fn atmosphere(&self) -> &AtmosphereSystem {
        &self.atmosphere
    }

    /// Seed of the debris stream, for reproducing a session.
    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }
}

fn warn_if_fog_outruns_city(config: &CityConfig) {
    let covered = config.coverage_behind();
    if config.fog_distance > covered {
        log::warn!(
            "Fog distance {} reaches past the {} units of city behind the camera; the far edge may show",
            config.fog_distance,
            covered
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Layer, SceneGraph};

    fn seeded(config: CityConfig) -> CityConfig {
        CityConfig {
            seed: Some(1234),
            ..config
        }
    }

    #[test]
    fn test_new_builds_every_chunk() {
        let mut scene = SceneGraph::new();
        let city = CitySystem::new(seeded(CityConfig::default()), &mut scene).unwrap();

        assert_eq!(city.seed(), 1234);
        assert_eq!(city.ideal_set().len(), 150);
        assert_eq!(city.world().debris.len(), 900);
        assert_eq!(scene.object_count(Layer::Buildings), 150);
        assert_eq!(city.camera().position, glam::Vec3::new(0.0, 8.0, 0.0));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut scene = SceneGraph::new();
        let config = CityConfig {
            debris_per_chunk: 0,
            ..Default::default()
        };
        assert!(CitySystem::new(config, &mut scene).is_err());
        assert_eq!(scene.object_count(Layer::Debris), 0);
    }

    #[test]
    fn test_random_seed_is_recorded() {
        let mut scene = SceneGraph::new();
        let city = CitySystem::new(CityConfig::default(), &mut scene).unwrap();
        // Rebuilding from the recorded seed reproduces the ideal set
        let mut other_scene = SceneGraph::new();
        let again = CitySystem::new(
            CityConfig {
                seed: Some(city.seed()),
                ..Default::default()
            },
            &mut other_scene,
        )
        .unwrap();
        assert_eq!(city.ideal_set(), again.ideal_set());
    }

    #[test]
    fn test_debris_count_edit_regenerates() {
        let mut scene = SceneGraph::new();
        let mut city = CitySystem::new(seeded(CityConfig::default()), &mut scene).unwrap();
        let old: Vec<_> = city.world().debris.iter().map(|d| d.handle).collect();

        city.apply_edit(ControlEdit::DebrisPerChunk(32), &mut scene).unwrap();

        assert_eq!(city.config().debris_per_chunk, 32);
        assert_eq!(city.ideal_set().len(), 32);
        assert_eq!(city.world().debris.len(), 32 * 6);
        assert_eq!(scene.object_count(Layer::Debris), 32 * 6);
        assert!(old.iter().all(|h| !scene.contains(*h)));
        // Buildings untouched
        assert_eq!(scene.object_count(Layer::Buildings), 150);
    }

    #[test]
    fn test_regeneration_is_repeatable() {
        let mut scene = SceneGraph::new();
        let mut city = CitySystem::new(seeded(CityConfig::default()), &mut scene).unwrap();
        let first = city.ideal_set().to_vec();

        city.regenerate_debris(&mut scene);
        city.regenerate_debris(&mut scene);

        assert_eq!(scene.object_count(Layer::Debris), 900);
        assert_eq!(city.world().debris.len(), 900);
        assert_ne!(city.ideal_set(), first.as_slice());
    }

    #[test]
    fn test_rejected_edit_leaves_state_untouched() {
        let mut scene = SceneGraph::new();
        let mut city = CitySystem::new(seeded(CityConfig::default()), &mut scene).unwrap();
        let before = city.config().clone();
        let handles: Vec<_> = city.world().debris.iter().map(|d| d.handle).collect();

        assert!(city.apply_edit(ControlEdit::Speed(-1.0), &mut scene).is_err());
        assert!(city.apply_edit(ControlEdit::DebrisPerChunk(0), &mut scene).is_err());

        assert_eq!(city.config(), &before);
        let after: Vec<_> = city.world().debris.iter().map(|d| d.handle).collect();
        assert_eq!(handles, after);
    }

    #[test]
    fn test_atmosphere_edits() {
        let mut scene = SceneGraph::new();
        let mut city = CitySystem::new(seeded(CityConfig::default()), &mut scene).unwrap();

        city.apply_edit(ControlEdit::Brightness(0.0), &mut scene).unwrap();
        city.apply_edit(ControlEdit::FogDistance(250.0), &mut scene).unwrap();
        city.apply_edit(ControlEdit::SkyColor(Color(0x203040)), &mut scene).unwrap();

        let state = city.atmosphere().state();
        assert_eq!(state.hemisphere_intensity, 0.0);
        assert_eq!(state.fog.far, 250.0);
        assert_eq!(state.clear_color, Color(0x203040).to_linear());
        assert!(scene.take_redraw_request());
    }

    #[test]
    fn test_speed_edit_applies_on_next_tick() {
        let mut scene = SceneGraph::new();
        let mut city = CitySystem::new(seeded(CityConfig::default()), &mut scene).unwrap();

        city.tick(1, &mut scene);
        city.apply_edit(ControlEdit::Speed(2.0), &mut scene).unwrap();
        let report = city.tick(1, &mut scene);

        assert_eq!(report.debris_updated, 900);
        assert!((city.camera().position.z - (-2.7)).abs() < 1e-4);
    }

    #[test]
    fn test_tick_after_regeneration_moves_new_debris() {
        let mut scene = SceneGraph::new();
        let mut city = CitySystem::new(seeded(CityConfig::default()), &mut scene).unwrap();
        city.apply_edit(ControlEdit::DebrisPerChunk(4), &mut scene).unwrap();

        let before: Vec<f32> = city.world().debris.iter().map(|d| d.position.y).collect();
        city.tick(1, &mut scene);
        for (piece, y) in city.world().debris.iter().zip(before) {
            let expected = (y + 0.7).rem_euclid(city.config().debris_period());
            assert!((piece.position.y - expected).abs() < 1e-3);
        }
    }
}
