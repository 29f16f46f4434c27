//! Control protocol - JSON command/response definitions

use serde::{Deserialize, Serialize};

/// Commands sent by a control client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum ControlCommand {
    /// Hemisphere light intensity (>= 0)
    SetBrightness { value: f32 },
    /// Fog far distance (> 0)
    SetFogDistance { value: f32 },
    /// Travel distance per tick (> 0)
    SetSpeed { value: f32 },
    /// Debris pieces per chunk; regenerates the debris field
    SetDebrisPerChunk { value: u32 },
    /// Sky and fog color as "#rrggbb"
    SetSkyColor { color: String },
    /// Get the current parameter set
    GetConfig,
    /// Get camera position and travel counters
    GetCameraState,
    /// Get object counts and the debris seed
    GetWorldInfo,
    /// Get FPS statistics over the rolling window
    GetFrameStats,
    /// Ping (health check)
    Ping,
}

impl ControlCommand {
    /// Whether this command changes parameters.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::SetBrightness { .. }
                | Self::SetFogDistance { .. }
                | Self::SetSpeed { .. }
                | Self::SetDebrisPerChunk { .. }
                | Self::SetSkyColor { .. }
        )
    }
}

/// Responses from the control server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ControlResponse {
    #[serde(rename = "ok")]
    Ok { data: ResponseData },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Response data variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    None,
    Pong { message: String },
    ParamsUpdated { description: String },
    ConfigState {
        brightness: f32,
        fog_distance: f32,
        speed: f32,
        debris_per_chunk: u32,
        sky_color: String,
        chunk_size: f32,
        chunks_at_a_time: u32,
        debris_max_ascend: f32,
    },
    CameraState {
        position: [f32; 3],
        fov_degrees: f32,
        aspect: f32,
        /// Distance into the current chunk
        travelled: f32,
        total_wraps: u64,
        total_ticks: u64,
    },
    WorldInfo {
        chunks: u32,
        ground_tiles: usize,
        buildings: usize,
        debris: usize,
        /// Size of the per-chunk ideal set
        ideal_set: usize,
        seed: u64,
    },
    FrameStats {
        current_fps: f32,
        frame_count: u64,
        avg_fps: f32,
        min_fps: f32,
        max_fps: f32,
    },
}

impl ControlResponse {
    pub fn ok(data: ResponseData) -> Self {
        Self::Ok { data }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            message: msg.into(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(ResponseData::Pong {
            message: "pong".into(),
        })
    }

    pub fn updated(description: impl Into<String>) -> Self {
        Self::ok(ResponseData::ParamsUpdated {
            description: description.into(),
        })
    }

    pub fn none() -> Self {
        Self::ok(ResponseData::None)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}
