//! Hand-authored building layout shared by every chunk.

use glam::Vec3;

use crate::city::config::CityConfig;

/// One building, relative to the chunk origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingSpec {
    /// Base position. `y` is where the bottom face sits before any rotation.
    pub position: Vec3,
    /// Width, height, depth
    pub size: Vec3,
    /// Rotation in degrees about X, Y, Z
    pub rotation_degrees: Vec3,
}

impl BuildingSpec {
    fn new(x: f32, y: f32, z: f32, footprint: f32, height: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            size: Vec3::new(footprint, height, footprint),
            rotation_degrees: Vec3::ZERO,
        }
    }

    fn rotated(mut self, rx: f32, ry: f32, rz: f32) -> Self {
        self.rotation_degrees = Vec3::new(rx, ry, rz);
        self
    }

    /// Leaning or collapsed buildings pivot about their base.
    pub fn is_rotated(&self) -> bool {
        self.rotation_degrees != Vec3::ZERO
    }

    /// Same building moved `z_offset` along the travel axis.
    pub fn offset_z(&self, z_offset: f32) -> Self {
        Self {
            position: self.position + Vec3::new(0.0, 0.0, z_offset),
            ..*self
        }
    }
}

/// The static skyline of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkLayout {
    buildings: Vec<BuildingSpec>,
}

impl ChunkLayout {
    pub fn new(buildings: Vec<BuildingSpec>) -> Self {
        Self { buildings }
    }

    /// The falling-city skyline, grouped by quadrant around the travel axis.
    pub fn falling_city(config: &CityConfig) -> Self {
        let sm = config.small_building_size;
        let lg = config.large_building_size;
        let b = BuildingSpec::new;

        let buildings = vec![
            // northwest
            b(-44.0, 4.0, -44.0, lg, 40.0).rotated(0.0, 35.0, -85.0),
            b(-56.0, -2.0, -32.0, sm, 52.0).rotated(15.0, 0.0, -12.0),
            b(-36.0, 0.0, -16.0, lg, 52.0).rotated(0.0, 0.0, -10.0),
            b(-24.0, 0.0, -36.0, sm, 52.0).rotated(0.0, 0.0, -10.0),
            b(-16.0, 0.0, -20.0, sm, 52.0).rotated(30.0, 0.0, 0.0),
            // northeast
            b(24.0, -2.0, -44.0, lg, 44.0).rotated(-15.0, 0.0, 15.0),
            b(40.0, 0.0, -36.0, sm, 48.0).rotated(0.0, 0.0, 15.0),
            b(48.0, 0.0, -36.0, sm, 38.0).rotated(0.0, 0.0, 12.0),
            b(20.0, 0.0, -24.0, sm, 40.0).rotated(0.0, 0.0, 15.0),
            b(32.0, 0.0, -24.0, sm, 48.0).rotated(0.0, 0.0, 15.0),
            b(42.0, 0.0, -24.0, sm, 38.0).rotated(0.0, 0.0, 15.0),
            b(48.0, 2.0, 1.0, lg, 32.0).rotated(0.0, -25.0, 80.0),
            // southwest
            b(-48.0, 0.0, 16.0, sm, 44.0).rotated(0.0, 0.0, -10.0),
            b(-32.0, 0.0, 16.0, sm, 48.0).rotated(0.0, 0.0, -15.0),
            b(-16.0, -2.0, 16.0, sm, 40.0).rotated(-10.0, 0.0, -12.0),
            b(-32.0, 0.0, 32.0, lg, 48.0).rotated(0.0, 0.0, 15.0),
            b(-48.0, 0.0, 48.0, sm, 20.0),
            b(-16.0, 0.0, 48.0, sm, 36.0).rotated(0.0, 0.0, 15.0),
            b(-48.0, 19.0, 48.0, sm, 20.0).rotated(0.0, 0.0, -15.0),
            // southeast
            b(30.0, 0.0, 52.0, lg, 48.0).rotated(0.0, 0.0, 20.0),
            b(24.0, 0.0, 20.0, sm, 40.0).rotated(0.0, 0.0, 5.0),
            b(40.0, 0.0, 24.0, sm, 40.0),
            b(24.0, 0.0, 32.0, sm, 36.0),
            b(52.0, 0.0, 12.0, sm, 20.0),
            b(36.0, 0.0, 32.0, lg, 48.0).rotated(0.0, 0.0, -25.0),
        ];

        Self { buildings }
    }

    pub fn buildings(&self) -> &[BuildingSpec] {
        &self.buildings
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Absolute specs for the chunk whose origin sits at `z_offset`.
    pub fn tile(&self, z_offset: f32) -> impl Iterator<Item = BuildingSpec> + '_ {
        self.buildings.iter().map(move |b| b.offset_z(z_offset))
    }
}
