//! Time management utilities

use std::time::Instant;

/// Monotonic frame clock feeding `on_frame` deltas
///
/// Deltas are clamped to `max_delta` so a stalled host (debugger break,
/// minimized window) does not make every animation jump to its end.
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new(max_delta: f32) -> Self {
        Self::starting_at(Instant::now(), max_delta)
    }

    /// Create a clock with an explicit start instant
    pub fn starting_at(start: Instant, max_delta: f32) -> Self {
        Self {
            last_frame: start,
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
            max_delta,
        }
    }

    /// Advance to the current instant and return the clamped delta
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance to `now` and return the clamped delta in seconds
    ///
    /// An instant earlier than the previous frame yields a zero delta.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32().min(self.max_delta);
        self.total_time += self.delta_time;
        if now > self.last_frame {
            self.last_frame = now;
        }
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total (clamped) elapsed time since clock creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since clock creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}
