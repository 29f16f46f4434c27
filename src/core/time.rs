//! Frame timing and tick pacing

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Length of the rolling window used for [`FrameStats`].
const STATS_WINDOW: Duration = Duration::from_secs(5);

/// Upper bound on ticks produced by a single [`TickClock::advance`] call.
/// Keeps a long stall (debugger, window drag) from replaying minutes of motion.
pub const MAX_TICKS_PER_FRAME: u32 = 8;

/// Frame rate summary over the rolling window
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct FrameStats {
    pub current_fps: f32,
    pub frame_count: u64,
    pub avg_fps: f32,
    pub min_fps: f32,
    pub max_fps: f32,
}

/// Tracks frame timing and calculates FPS
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
    /// (timestamp, frame_time_secs) for the rolling window
    history: VecDeque<(Instant, f32)>,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
            history: VecDeque::new(),
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        self.history.push_back((now, self.delta.as_secs_f32()));
        while let Some(&(timestamp, _)) = self.history.front() {
            if now.saturating_duration_since(timestamp) > STATS_WINDOW {
                self.history.pop_front();
            } else {
                break;
            }
        }

        // FPS refreshes once per second
        let fps_elapsed = now.saturating_duration_since(self.fps_timer);
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Summarize the frames recorded in the rolling window.
    pub fn stats(&self) -> FrameStats {
        let mut total_time = 0.0f32;
        let mut min_fps = f32::INFINITY;
        let mut max_fps = 0.0f32;

        for &(_, frame_time) in &self.history {
            total_time += frame_time;
            let fps = if frame_time > 0.0 { 1.0 / frame_time } else { 0.0 };
            min_fps = min_fps.min(fps);
            max_fps = max_fps.max(fps);
        }

        if self.history.is_empty() {
            min_fps = 0.0;
        }

        FrameStats {
            current_fps: self.fps,
            frame_count: self.frame_count,
            avg_fps: if total_time > 0.0 {
                self.history.len() as f32 / total_time
            } else {
                0.0
            },
            min_fps,
            max_fps,
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts frame time into whole animation ticks.
///
/// With no rate every frame is exactly one tick (display-locked motion).
/// With a rate, elapsed time accumulates and is drained in fixed steps.
#[derive(Debug, Clone)]
pub struct TickClock {
    rate: Option<f32>,
    accumulator: f32,
}

impl TickClock {
    pub fn new(rate: Option<f32>) -> Self {
        Self {
            rate,
            accumulator: 0.0,
        }
    }

    /// Number of ticks owed for a frame that took `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> u32 {
        let Some(rate) = self.rate else {
            return 1;
        };

        let step = 1.0 / rate;
        self.accumulator += dt.max(0.0);
        let owed = (self.accumulator / step).floor();
        let ticks = (owed as u32).min(MAX_TICKS_PER_FRAME);
        if owed as u32 > MAX_TICKS_PER_FRAME {
            // Drop the backlog instead of carrying it forward
            self.accumulator = 0.0;
        } else {
            self.accumulator -= ticks as f32 * step;
        }
        ticks
    }

    pub fn set_rate(&mut self, rate: Option<f32>) {
        self.rate = rate;
        self.accumulator = 0.0;
    }
}
