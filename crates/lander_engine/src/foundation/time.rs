//! Time management utilities
//!
//! [`FixedTimestep`] turns frame time into a whole number of fixed
//! simulation substeps, and [`Stopwatch`] times one-off work such as an
//! octree build.

use std::time::{Duration, Instant};

/// Accumulates frame time and releases it as fixed-size simulation steps
///
/// Keeps physics reproducible when frame time varies: the same total time
/// always yields the same number of steps of the same size.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
    max_substeps: u32,
}

impl FixedTimestep {
    /// Create a fixed timestep running at `hz` steps per second
    ///
    /// Non-positive rates fall back to 60 Hz; `max_substeps` is at least 1.
    pub fn new(hz: f32, max_substeps: u32) -> Self {
        let hz = if hz > 0.0 { hz } else { 60.0 };
        Self {
            step: 1.0 / hz,
            accumulator: 0.0,
            max_substeps: max_substeps.max(1),
        }
    }

    /// Size of one step in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed elapsed frame time, returning how many steps to run now
    ///
    /// Time beyond `max_substeps` steps is dropped so a long stall cannot
    /// trigger a burst of catch-up steps.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.step);
        }
        steps
    }

    /// Fraction of a step left over in the accumulator (0..1)
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Drop any accumulated time
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self
            .start_time
            .map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}
