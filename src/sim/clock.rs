//! Frame-driven simulation clock.
//!
//! Time and sweep angle are derived from a frame counter rather than
//! accumulated, so the sweep stays exactly `(n * step) mod 2π`.

use std::f64::consts::TAU;

use crate::core::FrameConfig;

#[derive(Clone, Debug)]
pub struct SimClock {
    frames: u64,
    time_step: f64,
    sweep_step: f64,
    paused: bool,
}

impl SimClock {
    pub fn new(frame: &FrameConfig) -> Self {
        Self {
            frames: 0,
            time_step: frame.time_step,
            sweep_step: frame.sweep_step,
            paused: false,
        }
    }

    /// Advance one frame. Returns `false` (and changes nothing) while paused.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Monotonic simulated seconds.
    pub fn time(&self) -> f64 {
        self.frames as f64 * self.time_step
    }

    /// Sweep angle in `[0, 2π)`.
    pub fn sweep_angle(&self) -> f64 {
        (self.frames as f64 * self.sweep_step).rem_euclid(TAU)
    }

    /// Simulated seconds per frame (the `dt` handed to the simulator).
    pub fn dt(&self) -> f64 {
        self.time_step
    }

    pub fn sweep_step(&self) -> f64 {
        self.sweep_step
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> SimClock {
        SimClock::new(&FrameConfig::default())
    }

    #[test]
    fn sweep_wraps_into_full_turn() {
        let mut c = clock();
        for n in 1..=5_000u64 {
            c.tick();
            let expected = (n as f64 * c.sweep_step()).rem_euclid(TAU);
            let sweep = c.sweep_angle();
            assert!((sweep - expected).abs() < 1e-12);
            assert!((0.0..TAU).contains(&sweep));
        }
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut c = clock();
        c.tick();
        c.set_paused(true);
        let (t, s) = (c.time(), c.sweep_angle());
        for _ in 0..100 {
            assert!(!c.tick());
        }
        assert_eq!(c.time(), t);
        assert_eq!(c.sweep_angle(), s);
        assert!(!c.toggle_pause());
        assert!(c.tick());
        assert!(c.time() > t);
    }
}
