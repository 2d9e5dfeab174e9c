//! Smoothing applied to the heart rate between task runs.

/// Length of the moving-average window.
pub const WINDOW: usize = 20;
/// Weight of the newest value in the low-pass stage.
pub const ALPHA: f32 = 0.05;

/// History carried from one run to the next: the moving-average ring and the
/// last low-pass output. Unwritten slots count as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    window: [f32; WINDOW],
    index: usize,
    previous: f32,
}

impl FilterState {
    pub const fn new() -> Self {
        Self {
            window: [0.0; WINDOW],
            index: 0,
            previous: 0.0,
        }
    }

    /// Store `value` in the oldest slot and return the mean of the window.
    pub fn moving_average(&mut self, value: f32) -> f32 {
        self.window[self.index] = value;
        self.index = (self.index + 1) % WINDOW;

        self.window.iter().sum::<f32>() / WINDOW as f32
    }

    /// Single-pole low-pass seeded by the previous output.
    pub fn low_pass(&mut self, value: f32) -> f32 {
        let filtered = ALPHA * value + (1.0 - ALPHA) * self.previous;
        self.previous = filtered;
        filtered
    }

    /// Moving average followed by low-pass.
    pub fn apply(&mut self, value: f32) -> f32 {
        let averaged = self.moving_average(value);
        self.low_pass(averaged)
    }

    pub fn previous(&self) -> f32 {
        self.previous
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}
