//! Lighting, fog and sky.
//!
//! The main entry point is [`AtmosphereSystem`], which derives an
//! [`AtmosphereState`] (CPU-side) and [`AtmosphereUniform`] (GPU-ready buffer)
//! from the city config and re-derives them whenever a control edit lands.

pub mod fog;
pub mod state;

pub use fog::{apply_fog, fog_factor};
pub use state::{AtmosphereState, AtmosphereUniform, FogState};

use crate::city::config::CityConfig;

/// Keeps the atmosphere in step with the config.
pub struct AtmosphereSystem {
    state: AtmosphereState,
}

impl AtmosphereSystem {
    pub fn new(config: &CityConfig) -> Self {
        Self {
            state: AtmosphereState::from_config(config),
        }
    }

    /// Recompute from `config`. Returns true if anything visible changed.
    pub fn sync(&mut self, config: &CityConfig) -> bool {
        let next = AtmosphereState::from_config(config);
        if next == self.state {
            return false;
        }
        self.state = next;
        true
    }

    /// Current atmosphere state (CPU-side).
    #[inline]
    pub fn state(&self) -> &AtmosphereState {
        &self.state
    }

    /// Build a GPU-ready uniform from current state.
    pub fn uniform(&self) -> AtmosphereUniform {
        AtmosphereUniform::from(&self.state)
    }

    /// Clear color for the render pass.
    pub fn clear_color(&self) -> [f32; 3] {
        self.state.clear_color
    }
}
