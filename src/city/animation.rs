//! Per-tick motion: camera travel and debris ascent/spin, both wrapped.
//!
//! Every quantity is advanced as `(value + delta).rem_euclid(period)` so the
//! state stays bounded for any runtime. Config validation guarantees
//! `delta <= period` for a single tick.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::city::config::CityConfig;
use crate::city::world::DebrisInstance;
use crate::core::camera::Camera;
use crate::scene::RenderBackend;

/// What one [`AnimationLoop::tick`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Ticks applied
    pub ticks: u32,
    /// Number of times the camera was snapped forward by one chunk
    pub camera_wraps: u32,
    pub debris_updated: usize,
}

/// Wrap `value + delta` into `[0, period)`. Returns the new value and how
/// many whole periods were removed.
pub fn wrap_advance(value: f32, delta: f32, period: f32) -> (f32, u32) {
    let raw = value + delta;
    let wrapped = raw.rem_euclid(period);
    // rem_euclid can round up to exactly `period` for tiny negative inputs
    let wrapped = if wrapped >= period { 0.0 } else { wrapped };
    let laps = ((raw - wrapped) / period).round().max(0.0) as u32;
    (wrapped, laps)
}

/// Rotation added per tick on each axis: one full turn per chunk of travel.
pub fn angle_step(config: &CityConfig) -> f32 {
    config.speed / config.chunk_size * TAU
}

/// Owns the camera and its travel state; advances debris in place.
pub struct AnimationLoop {
    camera: Camera,
    /// Distance travelled into the current chunk, in `[0, chunk_size)`
    travelled: f32,
    total_wraps: u64,
    total_ticks: u64,
}

impl AnimationLoop {
    pub fn new(config: &CityConfig) -> Self {
        let cam = &config.camera;
        let mut camera = Camera::new(Vec3::new(0.0, cam.height, 0.0), cam.fov_degrees, 16.0 / 9.0);
        camera.near = cam.near;
        camera.far = cam.far;

        Self {
            camera,
            travelled: 0.0,
            total_wraps: 0,
            total_ticks: 0,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Distance travelled into the current chunk.
    pub fn travelled(&self) -> f32 {
        self.travelled
    }

    /// Seam teleports since start.
    pub fn total_wraps(&self) -> u64 {
        self.total_wraps
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Advance by `ticks` ticks: camera first, then every debris piece in
    /// insertion order, then a redraw request.
    ///
    /// The debris slice is mutated in place; the collection itself never
    /// changes length here.
    pub fn tick(
        &mut self,
        config: &CityConfig,
        ticks: u32,
        debris: &mut [DebrisInstance],
        backend: &mut impl RenderBackend,
    ) -> TickReport {
        if ticks == 0 {
            return TickReport::default();
        }

        let steps = ticks as f32;

        // Camera moves toward -z; travelled distance wraps at one chunk
        let (travelled, camera_wraps) =
            wrap_advance(self.travelled, config.speed * steps, config.chunk_size);
        self.travelled = travelled;
        self.camera.position.z = -travelled;

        let rise = config.speed * steps;
        let spin = angle_step(config) * steps;
        let ceiling = config.debris_period();

        for piece in debris.iter_mut() {
            piece.position.y = wrap_advance(piece.position.y, rise, ceiling).0;
            piece.angles = Vec3::new(
                wrap_advance(piece.angles.x, spin, TAU).0,
                wrap_advance(piece.angles.y, spin, TAU).0,
                wrap_advance(piece.angles.z, spin, TAU).0,
            );
            backend.set_transform(piece.handle, piece.transform());
        }

        backend.request_redraw();

        self.total_wraps += camera_wraps as u64;
        self.total_ticks += ticks as u64;

        TickReport {
            ticks,
            camera_wraps,
            debris_updated: debris.len(),
        }
    }
}
