//! Audio clocks the scheduler can follow

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// The authoritative playback clock, in seconds
pub trait AudioClock: Send {
    fn current_time(&self) -> f64;
}

/// Monotonic wall clock starting at zero when created
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for SystemClock {
    fn current_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock moved by hand. Clones share the same time, so one copy can drive
/// a scheduler while another advances it (tests, offline rendering).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(time: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(time.to_bits())),
        }
    }

    pub fn set(&self, time: f64) {
        self.bits.store(time.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.current_time() + seconds);
    }
}

impl AudioClock for ManualClock {
    fn current_time(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(1.5);
        let driver = clock.clone();
        driver.advance(0.25);
        assert_eq!(clock.current_time(), 1.75);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.current_time();
        let b = clock.current_time();
        assert!(b >= a);
    }
}
