//! Debris field generation.
//!
//! One randomized "ideal set" of debris is generated per session and stamped
//! unchanged into every chunk; only the z offset differs between chunks.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::city::config::CityConfig;

/// Largest debris footprint, reached at the lateral chunk edge.
pub const MAX_DEBRIS_SIZE: f32 = 6.0;

/// One debris piece, relative to the chunk origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebrisSpec {
    pub position: Vec3,
    /// Width and depth
    pub size: f32,
    pub height: f32,
    /// Whole degrees in `[0, 360)` about X, Y, Z
    pub rotation_degrees: Vec3,
}

impl DebrisSpec {
    pub fn offset_z(&self, z_offset: f32) -> Self {
        Self {
            position: self.position + Vec3::new(0.0, 0.0, z_offset),
            ..*self
        }
    }

    /// Rotation converted to radians.
    pub fn rotation_radians(&self) -> Vec3 {
        Vec3::new(
            self.rotation_degrees.x.to_radians(),
            self.rotation_degrees.y.to_radians(),
            self.rotation_degrees.z.to_radians(),
        )
    }
}

/// `floor(u * (max - min)) + min` for uniform `u` in `[0, 1)`.
///
/// Integer-valued whenever `min` is; the upper bound is exclusive, so
/// `random_int(rng, 2.0, 3.0)` is always 2.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    (rng.random::<f32>() * (max - min)).floor() + min
}

/// Produces ideal sets from a seeded stream.
pub struct DebrisFieldGenerator {
    seed: u64,
    rng: ChaCha8Rng,
}

impl DebrisFieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed this generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a fresh ideal set of `debris_per_chunk` pieces.
    ///
    /// Successive calls continue the same stream, so a regeneration yields a
    /// new set while the whole session stays reproducible from the seed.
    pub fn generate(&mut self, config: &CityConfig) -> Vec<DebrisSpec> {
        generate_ideal_set(&mut self.rng, config)
    }
}

/// Draw one ideal set from `rng`.
///
/// Size grows with distance from the travel axis: pieces near `x = 0` are
/// almost invisible, pieces at the lateral edge reach [`MAX_DEBRIS_SIZE`].
pub fn generate_ideal_set<R: Rng + ?Sized>(rng: &mut R, config: &CityConfig) -> Vec<DebrisSpec> {
    let half_chunk = config.chunk_size / 2.0;
    let ascend = config.debris_period();

    (0..config.debris_per_chunk)
        .map(|_| {
            let x = random_int(rng, -half_chunk, half_chunk);
            let y = random_int(rng, 0.0, ascend);
            let z = random_int(rng, -half_chunk, half_chunk);

            let size = (x / half_chunk).abs() * MAX_DEBRIS_SIZE;
            let height = size * random_int(rng, 2.0, 3.0);

            let rotation_degrees = Vec3::new(
                random_int(rng, 0.0, 360.0),
                random_int(rng, 0.0, 360.0),
                random_int(rng, 0.0, 360.0),
            );

            DebrisSpec {
                position: Vec3::new(x, y, z),
                size,
                height,
                rotation_degrees,
            }
        })
        .collect()
}
