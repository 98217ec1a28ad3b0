use std::time::Instant;

pub const FPS_UPDATE_INTERVAL: f32 = 1.0;
/// Upper bound on a single frame step, so a stalled window doesn't spin the camera
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

/// Wall clock for the render loop plus a smoothed FPS readout
#[derive(Debug)]
pub struct FrameClock {
    frame_number: u64,
    start_time: Instant,
    last_frame_time: Instant,
    frame_count: u32,
    fps: f32,
    fps_timer: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
            frame_count: 0,
            fps: 0.0,
            fps_timer: 0.0,
        }
    }

    /// Start a new frame, measuring from the previous call
    pub fn tick(&mut self) -> FrameInfo {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;
        self.advance(delta, now.duration_since(self.start_time).as_secs_f32())
    }

    /// Start a new frame with an explicit step
    pub fn advance(&mut self, delta: f32, time: f32) -> FrameInfo {
        let delta = delta.clamp(0.0, MAX_FRAME_DELTA);
        let info = FrameInfo {
            number: self.frame_number,
            time,
            delta,
        };
        self.frame_number += 1;

        self.frame_count += 1;
        self.fps_timer += delta;
        if self.fps_timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.fps_timer;
            log::debug!("FPS: {:.1}", self.fps);
            self.frame_count = 0;
            self.fps_timer = 0.0;
        }

        info
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}
