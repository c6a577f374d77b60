//! Time management utilities

use std::time::{Duration, Instant};

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (based on last frame time)
    pub fn current_fps(&self) -> f32 {
        if self.delta_time > 0.0 {
            1.0 / self.delta_time
        } else {
            0.0
        }
    }
}

/// Fixed-timestep accumulator
///
/// Real frame time is fed in with [`FixedTimestep::accumulate`], which answers
/// how many fixed simulation steps to run this frame. Steps beyond
/// `max_steps` are dropped so a long stall cannot snowball into ever longer
/// frames.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: Duration,
    max_steps: u32,
    accumulator: Duration,
}

impl FixedTimestep {
    /// Create an accumulator with the given step length (seconds)
    pub fn new(step_seconds: f32, max_steps: u32) -> Self {
        Self {
            step: Duration::try_from_secs_f32(step_seconds.max(f32::EPSILON)).unwrap_or_else(|_| {
                log::warn!("Fixed step of {step_seconds}s is not representable, using 1s");
                Duration::from_secs(1)
            }),
            max_steps: max_steps.max(1),
            accumulator: Duration::ZERO,
        }
    }

    /// Length of one step in seconds
    pub fn step_seconds(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Add elapsed frame time and return the number of steps to simulate
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if steps == self.max_steps && self.accumulator >= self.step {
            log::debug!(
                "Dropping {:.3}s of simulation time after {} steps",
                self.accumulator.as_secs_f32(),
                steps
            );
            self.accumulator = Duration::ZERO;
        }

        steps
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_starts_at_zero() {
        let timer = Timer::new();
        assert_eq!(timer.frame_count(), 0);
        assert_eq!(timer.delta_time(), 0.0);
        assert_eq!(timer.current_fps(), 0.0);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= 0.0);
    }

    #[test]
    fn test_fixed_timestep_accumulates_partial_steps() {
        let mut timestep = FixedTimestep::new(0.01, 8);

        assert_eq!(timestep.accumulate(Duration::from_millis(5)), 0);
        assert_eq!(timestep.accumulate(Duration::from_millis(6)), 1);
        assert_eq!(timestep.accumulate(Duration::from_millis(25)), 2);
        assert!(timestep.alpha() < 1.0);
    }

    #[test]
    fn test_fixed_timestep_clamps_long_stalls() {
        let mut timestep = FixedTimestep::new(0.01, 4);

        assert_eq!(timestep.accumulate(Duration::from_secs(1)), 4);
        // The backlog is discarded rather than replayed next frame
        assert_eq!(timestep.accumulate(Duration::ZERO), 0);
    }

    #[test]
    fn test_fixed_timestep_unrepresentable_step_falls_back() {
        let timestep = FixedTimestep::new(f32::INFINITY, 1);
        assert_eq!(timestep.step_seconds(), 1.0);
    }
}
