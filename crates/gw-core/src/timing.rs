use serde::Serialize;

use crate::traits::CycleCounter;

/// Étape instrumentée du pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Frame capture plus conversion to floats.
    Acquisition,
    /// Forward FFT and magnitude reduction.
    Transform,
    /// RMS energy gate.
    Energy,
    /// Dominant-bin search and band lookup.
    Classification,
    /// Tally updates and the end-of-epoch decision.
    Voting,
}

impl Stage {
    /// Number of stages.
    pub const COUNT: usize = 5;

    /// Every stage, in pipeline order.
    pub const ALL: [Stage; Self::COUNT] = [
        Stage::Acquisition,
        Stage::Transform,
        Stage::Energy,
        Stage::Classification,
        Stage::Voting,
    ];

    #[inline(always)]
    fn index(self) -> usize {
        match self {
            Stage::Acquisition => 0,
            Stage::Transform => 1,
            Stage::Energy => 2,
            Stage::Classification => 3,
            Stage::Voting => 4,
        }
    }
}

/// Compteurs de ticks par étape, cumulés sur une époque.
///
/// Purement observationnel : rien dans le pipeline ne lit ces valeurs pour
/// décider quoi que ce soit.
///
/// # Example
/// ```
/// use gw_core::timing::{Stage, TimingAccumulator};
/// let mut acc = TimingAccumulator::default();
/// acc.add(Stage::Transform, 120);
/// acc.add(Stage::Transform, 30);
/// assert_eq!(acc.get(Stage::Transform), 150);
/// acc.reset();
/// assert_eq!(acc.total(), 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimingAccumulator {
    ticks: [u64; Stage::COUNT],
}

impl TimingAccumulator {
    /// Add `ticks` to `stage`.
    #[inline(always)]
    pub fn add(&mut self, stage: Stage, ticks: u64) {
        let slot = &mut self.ticks[stage.index()];
        *slot = slot.saturating_add(ticks);
    }

    /// Add the ticks elapsed since `start` on `counter` to `stage`.
    #[inline(always)]
    pub fn record_since(&mut self, stage: Stage, counter: &dyn CycleCounter, start: u64) {
        self.add(stage, counter.now().wrapping_sub(start));
    }

    /// Ticks accumulated for `stage`.
    #[must_use]
    pub fn get(&self, stage: Stage) -> u64 {
        self.ticks[stage.index()]
    }

    /// Sum over all stages.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.ticks.iter().fold(0u64, |acc, &t| acc.saturating_add(t))
    }

    /// Zero every stage.
    pub fn reset(&mut self) {
        self.ticks = [0; Stage::COUNT];
    }

    /// Snapshot in ticks and seconds for a counter running at `frequency_hz`.
    #[must_use]
    pub fn snapshot(&self, frequency_hz: f64) -> Vec<StageTiming> {
        Stage::ALL
            .iter()
            .map(|&stage| StageTiming::new(stage, self.get(stage), frequency_hz))
            .collect()
    }
}

/// Elapsed time of one stage over an epoch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageTiming {
    /// Stage measured.
    pub stage: Stage,
    /// Counter ticks.
    pub ticks: u64,
    /// Same duration in seconds.
    pub seconds: f64,
}

impl StageTiming {
    /// Convert `ticks` at `frequency_hz` into a timing entry.
    #[must_use]
    pub fn new(stage: Stage, ticks: u64, frequency_hz: f64) -> Self {
        Self {
            stage,
            ticks,
            seconds: ticks_to_secs(ticks, frequency_hz),
        }
    }
}

/// Counter that never advances, for untimed runs.
///
/// # Example
/// ```
/// use gw_core::timing::NoopCounter;
/// use gw_core::traits::CycleCounter;
/// assert_eq!(NoopCounter.now(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCounter;

impl CycleCounter for NoopCounter {
    fn now(&self) -> u64 {
        0
    }

    fn frequency_hz(&self) -> f64 {
        0.0
    }
}

/// `ticks / frequency_hz`, or 0 for a non-positive frequency.
#[inline]
#[must_use]
pub fn ticks_to_secs(ticks: u64, frequency_hz: f64) -> f64 {
    if frequency_hz <= 0.0 {
        return 0.0;
    }
    ticks as f64 / frequency_hz
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct StepCounter {
        now: Cell<u64>,
    }

    impl CycleCounter for StepCounter {
        fn now(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t.wrapping_add(10));
            t
        }

        fn frequency_hz(&self) -> f64 {
            80e6
        }
    }

    #[test]
    fn record_since_handles_wraparound() {
        let counter = StepCounter {
            now: Cell::new(u64::MAX - 4),
        };
        let mut acc = TimingAccumulator::default();
        let start = counter.now();
        acc.record_since(Stage::Acquisition, &counter, start);
        assert_eq!(acc.get(Stage::Acquisition), 10);
    }

    #[test]
    fn snapshot_converts_to_seconds() {
        let mut acc = TimingAccumulator::default();
        acc.add(Stage::Voting, 80_000_000);
        let snap = acc.snapshot(80e6);
        assert_eq!(snap.len(), Stage::COUNT);
        let voting = snap.iter().find(|t| t.stage == Stage::Voting).unwrap();
        assert!((voting.seconds - 1.0).abs() < 1e-9);
        assert_eq!(ticks_to_secs(100, 0.0), 0.0);
    }
}
