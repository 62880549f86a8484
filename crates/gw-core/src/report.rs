use serde::Serialize;

use crate::label::ClassLabel;
use crate::tally::{Decision, DecisionKind, EpochTally};
use crate::timing::StageTiming;

/// Everything published at the end of an epoch.
///
/// # Example
/// ```
/// use gw_core::report::EpochReport;
/// use gw_core::label::ClassLabel;
/// let report = EpochReport::default();
/// assert_eq!(report.label(), ClassLabel::NoActivity);
/// assert!(report.dominant_hz.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpochReport {
    /// Epoch number, starting at 0.
    pub epoch: u64,
    /// Vote outcome.
    pub decision: Decision,
    /// Dominant frequency of the strongest active sub-window, if any passed the gate.
    pub dominant_hz: Option<u32>,
    /// Number of sub-windows processed.
    pub sub_windows: usize,
    /// Per-stage timings for this epoch.
    pub stages: Vec<StageTiming>,
    /// Whole active part of the epoch (acquisition to decision), in ticks.
    pub active_ticks: u64,
    /// Same, in seconds.
    pub active_secs: f64,
    /// Idle time that preceded this epoch, in seconds (0 for the first one).
    pub previous_idle_secs: f64,
}

impl EpochReport {
    /// Decided label.
    #[must_use]
    pub fn label(&self) -> ClassLabel {
        self.decision.label
    }
}

impl Default for EpochReport {
    fn default() -> Self {
        Self {
            epoch: 0,
            decision: Decision {
                label: ClassLabel::NoActivity,
                kind: DecisionKind::Majority,
                weighted: EpochTally::default(),
            },
            dominant_hz: None,
            sub_windows: 0,
            stages: Vec::new(),
            active_ticks: 0,
            active_secs: 0.0,
            previous_idle_secs: 0.0,
        }
    }
}
