/// Averages frame rate over fixed reporting intervals.
///
/// Driven by the frame delta the caller already has, so it works the same
/// with real and simulated time.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: f32,
    frame_count: u32,
    accumulated_time: f32,
    current_fps: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub const DEFAULT_INTERVAL: f32 = 0.5;

    #[must_use]
    pub fn new() -> Self {
        Self::with_interval(Self::DEFAULT_INTERVAL)
    }

    #[must_use]
    pub fn with_interval(interval: f32) -> Self {
        Self {
            interval,
            frame_count: 0,
            accumulated_time: 0.0,
            current_fps: 0.0,
        }
    }

    /// Records one frame of `dt` seconds. Returns the new average when an
    /// interval completes.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        self.frame_count += 1;
        self.accumulated_time += dt;

        if self.accumulated_time >= self.interval {
            self.current_fps = self.frame_count as f32 / self.accumulated_time;

            self.accumulated_time = 0.0;
            self.frame_count = 0;

            return Some(self.current_fps);
        }

        None
    }

    #[must_use]
    pub fn fps(&self) -> f32 {
        self.current_fps
    }
}
