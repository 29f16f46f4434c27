//! Bridge between the control server thread and the render loop.
//!
//! The server thread never touches the city. It validates edits against the
//! accepted config, queues them, and answers queries from a snapshot that the
//! render loop publishes once per frame. The render loop drains the queue
//! between ticks.

use std::sync::{Arc, Mutex, MutexGuard};

use fallcity_control::{ControlCommand, ControlHandler, ControlResponse, ResponseData};

use crate::city::{CityConfig, CitySystem, ControlEdit};
use crate::core::time::FrameStats;

/// Camera values published each frame
#[derive(Clone, Debug, Default)]
pub struct CameraSnapshot {
    pub position: [f32; 3],
    pub fov_degrees: f32,
    pub aspect: f32,
    pub travelled: f32,
    pub total_wraps: u64,
    pub total_ticks: u64,
}

/// Object counts published each frame
#[derive(Clone, Debug, Default)]
pub struct WorldSnapshot {
    pub chunks: u32,
    pub ground_tiles: usize,
    pub buildings: usize,
    pub debris: usize,
    pub ideal_set: usize,
    pub seed: u64,
}

/// State shared between the control server and the render loop
#[derive(Default)]
pub struct SharedControlState {
    /// Committed config plus every queued edit
    accepted: CityConfig,
    pending_edits: Vec<ControlEdit>,
    camera: CameraSnapshot,
    world: WorldSnapshot,
    frame_stats: FrameStats,
}

impl SharedControlState {
    pub fn new(city: &CitySystem) -> Self {
        let mut state = Self {
            accepted: city.config().clone(),
            ..Default::default()
        };
        state.publish(city, FrameStats::default());
        state
    }

    /// Validate `edit` against the accepted config and queue it.
    pub fn submit(&mut self, edit: ControlEdit) -> crate::core::types::Result<()> {
        self.accepted = edit.applied_to(&self.accepted)?;
        self.pending_edits.push(edit);
        Ok(())
    }

    /// Take every queued edit, oldest first.
    pub fn drain_edits(&mut self) -> Vec<ControlEdit> {
        std::mem::take(&mut self.pending_edits)
    }

    pub fn accepted_config(&self) -> &CityConfig {
        &self.accepted
    }

    /// Refresh the query snapshot from the live city.
    pub fn publish(&mut self, city: &CitySystem, frame_stats: FrameStats) {
        let camera = city.camera();
        let animation = city.animation();
        self.camera = CameraSnapshot {
            position: camera.position.to_array(),
            fov_degrees: camera.fov_y.to_degrees(),
            aspect: camera.aspect,
            travelled: animation.travelled(),
            total_wraps: animation.total_wraps(),
            total_ticks: animation.total_ticks(),
        };

        let world = city.world();
        self.world = WorldSnapshot {
            chunks: city.config().chunks_at_a_time,
            ground_tiles: world.ground.len(),
            buildings: world.buildings.len(),
            debris: world.debris.len(),
            ideal_set: city.ideal_set().len(),
            seed: city.seed(),
        };
        self.frame_stats = frame_stats;
    }
}

/// Lock the shared state, recovering from a poisoned lock.
pub fn lock(state: &Mutex<SharedControlState>) -> MutexGuard<'_, SharedControlState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// [`ControlHandler`] backed by [`SharedControlState`]
pub struct AppControlHandler {
    state: Arc<Mutex<SharedControlState>>,
}

impl AppControlHandler {
    pub fn new(state: Arc<Mutex<SharedControlState>>) -> Self {
        Self { state }
    }
}

impl ControlHandler for AppControlHandler {
    fn handle_command(&mut self, cmd: ControlCommand) -> ControlResponse {
        let mut s = lock(&self.state);

        match ControlEdit::from_command(&cmd) {
            Err(e) => return ControlResponse::error(e.to_string()),
            Ok(Some(edit)) => {
                return match s.submit(edit) {
                    Ok(()) => ControlResponse::updated(format!("{edit} (applies before next tick)")),
                    Err(e) => ControlResponse::error(e.to_string()),
                };
            }
            Ok(None) => {}
        }

        match cmd {
            ControlCommand::Ping => ControlResponse::pong(),

            ControlCommand::GetConfig => {
                let c = &s.accepted;
                ControlResponse::ok(ResponseData::ConfigState {
                    brightness: c.brightness,
                    fog_distance: c.fog_distance,
                    speed: c.speed,
                    debris_per_chunk: c.debris_per_chunk,
                    sky_color: c.palette.sky.to_string(),
                    chunk_size: c.chunk_size,
                    chunks_at_a_time: c.chunks_at_a_time,
                    debris_max_ascend: c.debris_max_ascend,
                })
            }

            ControlCommand::GetCameraState => {
                let c = &s.camera;
                ControlResponse::ok(ResponseData::CameraState {
                    position: c.position,
                    fov_degrees: c.fov_degrees,
                    aspect: c.aspect,
                    travelled: c.travelled,
                    total_wraps: c.total_wraps,
                    total_ticks: c.total_ticks,
                })
            }

            ControlCommand::GetWorldInfo => {
                let w = &s.world;
                ControlResponse::ok(ResponseData::WorldInfo {
                    chunks: w.chunks,
                    ground_tiles: w.ground_tiles,
                    buildings: w.buildings,
                    debris: w.debris,
                    ideal_set: w.ideal_set,
                    seed: w.seed,
                })
            }

            ControlCommand::GetFrameStats => {
                let f = s.frame_stats;
                ControlResponse::ok(ResponseData::FrameStats {
                    current_fps: f.current_fps,
                    frame_count: f.frame_count,
                    avg_fps: f.avg_fps,
                    min_fps: f.min_fps,
                    max_fps: f.max_fps,
                })
            }

            // Edits returned above
            _ => ControlResponse::error(format!("Unhandled command: {cmd:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;

    fn setup() -> (SceneGraph, CitySystem, Arc<Mutex<SharedControlState>>) {
        let mut scene = SceneGraph::new();
        let config = CityConfig {
            seed: Some(5),
            debris_per_chunk: 10,
            ..Default::default()
        };
        let city = CitySystem::new(config, &mut scene).unwrap();
        let state = Arc::new(Mutex::new(SharedControlState::new(&city)));
        (scene, city, state)
    }

    fn data(response: ControlResponse) -> ResponseData {
        match response {
            ControlResponse::Ok { data } => data,
            ControlResponse::Error { message } => panic!("unexpected error: {message}"),
        }
    }

    #[test]
    fn test_edit_is_queued_not_applied() {
        let (_scene, city, state) = setup();
        let mut handler = AppControlHandler::new(state.clone());

        let response = handler.handle_command(ControlCommand::SetSpeed { value: 1.5 });
        assert!(response.is_ok());

        // City untouched until the render loop drains
        assert_eq!(city.config().speed, 0.7);
        let edits = lock(&state).drain_edits();
        assert_eq!(edits, vec![ControlEdit::Speed(1.5)]);
        assert!(lock(&state).drain_edits().is_empty());
    }

    #[test]
    fn test_invalid_edit_rejected_up_front() {
        let (_scene, _city, state) = setup();
        let mut handler = AppControlHandler::new(state.clone());

        let response = handler.handle_command(ControlCommand::SetSpeed { value: 0.0 });
        assert!(matches!(response, ControlResponse::Error { ref message } if message.contains("speed")));

        let response = handler.handle_command(ControlCommand::SetSkyColor { color: "nope".into() });
        assert!(!response.is_ok());

        let response = handler.handle_command(ControlCommand::SetDebrisPerChunk { value: 0 });
        assert!(!response.is_ok());

        assert!(lock(&state).drain_edits().is_empty());
        assert_eq!(lock(&state).accepted_config().speed, 0.7);
    }

    #[test]
    fn test_queued_edits_chain() {
        let (_scene, _city, state) = setup();
        let mut handler = AppControlHandler::new(state.clone());

        handler.handle_command(ControlCommand::SetFogDistance { value: 300.0 });
        handler.handle_command(ControlCommand::SetSkyColor { color: "#112233".into() });

        match data(handler.handle_command(ControlCommand::GetConfig)) {
            ResponseData::ConfigState { fog_distance, sky_color, .. } => {
                assert_eq!(fog_distance, 300.0);
                assert_eq!(sky_color, "#112233");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_drained_edits_apply_cleanly() {
        let (mut scene, mut city, state) = setup();
        let mut handler = AppControlHandler::new(state.clone());

        handler.handle_command(ControlCommand::SetDebrisPerChunk { value: 3 });
        handler.handle_command(ControlCommand::SetBrightness { value: 0.25 });

        for edit in lock(&state).drain_edits() {
            city.apply_edit(edit, &mut scene).unwrap();
        }
        assert_eq!(city.config(), lock(&state).accepted_config());

        lock(&state).publish(&city, FrameStats::default());
        match data(handler.handle_command(ControlCommand::GetWorldInfo)) {
            ResponseData::WorldInfo { debris, ideal_set, seed, .. } => {
                assert_eq!(ideal_set, 3);
                assert_eq!(debris, 3 * 6);
                assert_eq!(seed, 5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_camera_state_reflects_publish() {
        let (mut scene, mut city, state) = setup();
        let mut handler = AppControlHandler::new(state.clone());

        city.tick(10, &mut scene);
        lock(&state).publish(&city, FrameStats::default());

        match data(handler.handle_command(ControlCommand::GetCameraState)) {
            ResponseData::CameraState { position, total_ticks, travelled, .. } => {
                assert_eq!(total_ticks, 10);
                assert!((travelled - 7.0).abs() < 1e-4);
                assert!((position[2] + 7.0).abs() < 1e-4);
                assert_eq!(position[1], 8.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ping() {
        let (_scene, _city, state) = setup();
        let mut handler = AppControlHandler::new(state);
        assert!(matches!(
            data(handler.handle_command(ControlCommand::Ping)),
            ResponseData::Pong { .. }
        ));
    }
}
