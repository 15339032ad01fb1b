use std::time::{Duration, Instant};

use crate::constants::FPS_REPORT_INTERVAL_SECS;

/// Counts presented frames and reports the rate once per interval.
pub struct FrameCounter {
    frames: u32,
    window_start: Instant,
    interval: Duration,
    fps: Option<u32>,
}

impl FrameCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            interval: Duration::from_secs_f64(FPS_REPORT_INTERVAL_SECS),
            fps: None,
        }
    }

    /// Most recent completed measurement
    pub fn fps(&self) -> Option<u32> {
        self.fps
    }

    /// Record one frame. Returns the frame count for the interval that just
    /// closed, if any.
    pub fn tick_at(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        if now.duration_since(self.window_start) < self.interval {
            return None;
        }

        let fps = self.frames;
        self.frames = 0;
        self.window_start = now;
        self.fps = Some(fps);
        tracing::info!(fps, "frame rate");
        Some(fps)
    }
}
