use std::time::{Duration, Instant};

use gw_core::traits::{CycleCounter, IdleWait};

/// Veille par `thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SleepIdle;

impl IdleWait for SleepIdle {
    fn wait(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Compteur monotone en nanosecondes depuis la création.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicCounter {
    origin: Instant,
}

impl MonotonicCounter {
    /// Counter starting at 0 now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleCounter for MonotonicCounter {
    fn now(&self) -> u64 {
        // u64 ns: ~584 ans
        self.origin.elapsed().as_nanos() as u64
    }

    fn frequency_hz(&self) -> f64 {
        1e9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_monotonic_and_sleep_is_measured() {
        let counter = MonotonicCounter::new();
        let start = counter.now();
        SleepIdle.wait(Duration::from_millis(5));
        let elapsed = counter.now().wrapping_sub(start);
        assert!(elapsed >= 5_000_000);
        assert!(counter.frequency_hz() > 0.0);
    }
}
