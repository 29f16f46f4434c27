//! Distance fog.

use crate::atmosphere::state::FogState;

/// Fog blend for a fragment `distance` from the eye.
///
/// Returns a value in `[0.0, 1.0]` where 0 = no fog and 1 = fully fogged.
/// The ramp between `near` and `far` is smoothed at both ends, matching
/// the `smoothstep` used by the city shader.
pub fn fog_factor(distance: f32, fog: &FogState) -> f32 {
    if fog.far <= fog.near {
        return if distance >= fog.far { 1.0 } else { 0.0 };
    }
    let t = ((distance - fog.near) / (fog.far - fog.near)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Blend `color` toward the fog color.
pub fn apply_fog(color: [f32; 3], distance: f32, fog: &FogState) -> [f32; 3] {
    let f = fog_factor(distance, fog);
    [
        color[0] + (fog.color[0] - color[0]) * f,
        color[1] + (fog.color[1] - color[1]) * f,
        color[2] + (fog.color[2] - color[2]) * f,
    ]
}
