//! Atmosphere runtime state and GPU uniform.

use bytemuck::{Pod, Zeroable};

use crate::city::config::{CityConfig, Color};

/// Fog start distance; fog is effectively on from the eye outward.
pub const FOG_NEAR: f32 = 0.01;

/// Where the hemisphere light sits; only its direction from the origin matters.
pub const HEMISPHERE_POSITION: [f32; 3] = [0.0, 8.0, 0.0];

// ---------------------------------------------------------------------------
// Fog
// ---------------------------------------------------------------------------

/// Distance fog blended toward `color` between `near` and `far`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogState {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

// ---------------------------------------------------------------------------
// CPU-side state
// ---------------------------------------------------------------------------

/// Lighting, fog and sky derived from the city config.
#[derive(Clone, Debug, PartialEq)]
pub struct AtmosphereState {
    // Ambient
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,

    // Hemisphere light
    pub hemisphere_sky_color: [f32; 3],
    pub hemisphere_ground_color: [f32; 3],
    pub hemisphere_intensity: f32,
    /// Normalized direction toward the light
    pub hemisphere_direction: [f32; 3],

    pub fog: FogState,

    /// Framebuffer clear color (linear)
    pub clear_color: [f32; 3],
}

impl AtmosphereState {
    pub fn from_config(config: &CityConfig) -> Self {
        let sky = config.palette.sky.to_linear();
        let direction = glam::Vec3::from(HEMISPHERE_POSITION).normalize_or_zero();

        Self {
            ambient_color: config.palette.light.to_linear(),
            ambient_intensity: 1.0,
            hemisphere_sky_color: Color::WHITE.to_linear(),
            hemisphere_ground_color: Color::WHITE.to_linear(),
            hemisphere_intensity: config.brightness,
            hemisphere_direction: direction.to_array(),
            fog: FogState {
                color: sky,
                near: FOG_NEAR,
                far: config.fog_distance,
            },
            clear_color: sky,
        }
    }
}

impl Default for AtmosphereState {
    fn default() -> Self {
        Self::from_config(&CityConfig::default())
    }
}

// ---------------------------------------------------------------------------
// GPU uniform
// ---------------------------------------------------------------------------

/// GPU-ready atmosphere uniform buffer.
///
/// All `vec3` fields are padded to 16-byte alignment for WGSL compatibility.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct AtmosphereUniform {
    // -- Ambient (16 bytes) --
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,

    // -- Hemisphere (16 + 16 + 16 = 48 bytes) --
    pub hemisphere_sky_color: [f32; 3],
    pub hemisphere_intensity: f32,
    pub hemisphere_ground_color: [f32; 3],
    pub _pad0: f32,
    pub hemisphere_direction: [f32; 3],
    pub _pad1: f32,

    // -- Fog (16 + 16 = 32 bytes) --
    pub fog_color: [f32; 3],
    pub fog_near: f32,
    pub fog_far: f32,
    pub _pad2: [f32; 3],
}

impl Default for AtmosphereUniform {
    fn default() -> Self {
        Self::from(&AtmosphereState::default())
    }
}

impl From<&AtmosphereState> for AtmosphereUniform {
    fn from(s: &AtmosphereState) -> Self {
        Self {
            ambient_color: s.ambient_color,
            ambient_intensity: s.ambient_intensity,
            hemisphere_sky_color: s.hemisphere_sky_color,
            hemisphere_intensity: s.hemisphere_intensity,
            hemisphere_ground_color: s.hemisphere_ground_color,
            _pad0: 0.0,
            hemisphere_direction: s.hemisphere_direction,
            _pad1: 0.0,
            fog_color: s.fog.color,
            fog_near: s.fog.near,
            fog_far: s.fog.far,
            _pad2: [0.0; 3],
        }
    }
}
