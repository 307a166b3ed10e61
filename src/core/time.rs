//! Simulation timing utilities

use serde::{Deserialize, Serialize};

/// Virtual simulation clock in milliseconds.
///
/// The simulation never reads wall time. The frame driver advances this
/// clock by the elapsed frame time, and every timestamp inside the core
/// (actor staleness, spawn timers) is taken from it. Tests can therefore
/// jump forward by arbitrary amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    now_ms: f64,
    frame_count: u64,
}

impl SimClock {
    /// Create a clock at t = 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `elapsed_ms`.
    ///
    /// Negative or non-finite deltas are treated as zero so a broken frame
    /// timer can never move time backwards.
    pub fn advance(&mut self, elapsed_ms: f64) {
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.now_ms += elapsed_ms;
        }
        self.frame_count += 1;
    }

    /// Current time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut clock = SimClock::new();
        clock.advance(16.0);
        clock.advance(16.0);
        assert_eq!(clock.now_ms(), 32.0);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_rejects_bad_deltas() {
        let mut clock = SimClock::new();
        clock.advance(100.0);
        clock.advance(-50.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.now_ms(), 100.0);
        assert_eq!(clock.frame_count(), 3);
    }
}
