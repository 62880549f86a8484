use gw_core::config::DetectorConfig;
use gw_core::label::ClassLabel;
use gw_core::tally::{Decision, DecisionKind, EpochTally};

/// Vote majoritaire sur les sous-fenêtres d'une époque.
///
/// Deux états : accumulation (`increment`, une fois par sous-fenêtre) puis
/// décision (`decide`), qui remet les compteurs à zéro. La décision :
///
/// 1. divise le compteur NoActivity par `noise_weight_divisor` (division entière),
/// 2. retient un label strictement supérieur à tous les autres,
/// 3. sinon départage dans l'ordre GlassBreak, Footsteps, Voices, NoActivity, Other.
///
/// # Example
/// ```
/// use gw_audio::vote::VotingAggregator;
/// use gw_core::label::ClassLabel;
///
/// let mut voter = VotingAggregator::new(3, 5);
/// voter.increment(ClassLabel::Voices);
/// voter.increment(ClassLabel::NoActivity);
/// voter.increment(ClassLabel::NoActivity);
/// assert!(voter.is_complete());
/// let decision = voter.decide();
/// // 2 / 5 = 0 quiet windows against 1 voice window
/// assert_eq!(decision.label, ClassLabel::Voices);
/// assert_eq!(voter.observed(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct VotingAggregator {
    tally: EpochTally,
    sub_windows: usize,
    observed: usize,
    noise_divisor: u32,
}

impl VotingAggregator {
    /// Aggregator deciding after `sub_windows` labels, dividing the
    /// NoActivity tally by `noise_divisor`.
    #[must_use]
    pub fn new(sub_windows: usize, noise_divisor: u32) -> Self {
        Self {
            tally: EpochTally::default(),
            sub_windows: sub_windows.max(1),
            observed: 0,
            noise_divisor: noise_divisor.max(1),
        }
    }

    /// Aggregator sized from `config`.
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.sub_windows(), config.noise_weight_divisor)
    }

    /// Count one sub-window.
    #[inline]
    pub fn increment(&mut self, label: ClassLabel) {
        self.tally.increment(label);
        self.observed += 1;
    }

    /// `true` once the epoch's sub-window count has been reached.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.observed >= self.sub_windows
    }

    /// Sub-windows counted since the last decision.
    #[must_use]
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Sub-windows per epoch.
    #[must_use]
    pub fn sub_windows(&self) -> usize {
        self.sub_windows
    }

    /// Raw tally so far.
    #[must_use]
    pub fn tally(&self) -> &EpochTally {
        &self.tally
    }

    /// Decide the epoch and reset for the next one.
    pub fn decide(&mut self) -> Decision {
        if !self.is_complete() {
            log::warn!(
                "Vote anticipé : {}/{} sous-fenêtres",
                self.observed,
                self.sub_windows
            );
        }
        let decision = decide_tally(self.tally, self.noise_divisor);
        self.reset();
        decision
    }

    /// Drop the partial tally without deciding.
    pub fn reset(&mut self) {
        self.tally.reset();
        self.observed = 0;
    }
}

/// Apply the NoActivity down-weight, the strict-majority rule and the
/// priority tie-break to `tally`.
///
/// # Example
/// ```
/// use gw_audio::vote::decide_tally;
/// use gw_core::label::ClassLabel;
/// use gw_core::tally::{DecisionKind, EpochTally};
///
/// let tally = EpochTally::from_counts(&[(ClassLabel::GlassBreak, 3), (ClassLabel::Footsteps, 3)]);
/// let decision = decide_tally(tally, 5);
/// assert_eq!(decision.label, ClassLabel::GlassBreak);
/// assert_eq!(decision.kind, DecisionKind::TieBreak);
/// ```
#[must_use]
pub fn decide_tally(tally: EpochTally, noise_divisor: u32) -> Decision {
    let mut weighted = tally;
    weighted.set(
        ClassLabel::NoActivity,
        tally.get(ClassLabel::NoActivity) / noise_divisor.max(1),
    );

    if let Some(label) = strict_majority(&weighted) {
        return Decision {
            label,
            kind: DecisionKind::Majority,
            weighted,
        };
    }

    Decision {
        label: tie_break(&weighted),
        kind: DecisionKind::TieBreak,
        weighted,
    }
}

/// Label strictly above every other, if there is one.
fn strict_majority(tally: &EpochTally) -> Option<ClassLabel> {
    ClassLabel::ALL.into_iter().find(|&candidate| {
        ClassLabel::ALL
            .into_iter()
            .filter(|&other| other != candidate)
            .all(|other| tally.get(candidate) > tally.get(other))
    })
}

/// First label in priority order whose count is >= every lower-priority count.
fn tie_break(tally: &EpochTally) -> ClassLabel {
    let order = ClassLabel::TIE_BREAK_PRIORITY;
    for (i, &candidate) in order.iter().enumerate() {
        let count = tally.get(candidate);
        if order[i + 1..].iter().all(|&lower| count >= tally.get(lower)) {
            return candidate;
        }
    }
    // The last entry has no lower-priority rival, so the loop always returns.
    order[order.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_tie_goes_to_glass_break() {
        let tally =
            EpochTally::from_counts(&[(ClassLabel::GlassBreak, 3), (ClassLabel::Footsteps, 3)]);
        let decision = decide_tally(tally, 5);
        assert_eq!(decision.label, ClassLabel::GlassBreak);
        assert_eq!(decision.kind, DecisionKind::TieBreak);
    }

    #[test]
    fn quiet_majority_down_weighted_boundary() {
        // 25 / 5 = 5 beats 4
        let quiet =
            EpochTally::from_counts(&[(ClassLabel::NoActivity, 25), (ClassLabel::GlassBreak, 4)]);
        let decision = decide_tally(quiet, 5);
        assert_eq!(decision.label, ClassLabel::NoActivity);
        assert_eq!(decision.kind, DecisionKind::Majority);
        assert_eq!(decision.weighted.get(ClassLabel::NoActivity), 5);

        // 6 > 5 flips it
        let loud =
            EpochTally::from_counts(&[(ClassLabel::NoActivity, 25), (ClassLabel::GlassBreak, 6)]);
        assert_eq!(decide_tally(loud, 5).label, ClassLabel::GlassBreak);

        // 5 == 5 is a tie, glass break outranks no activity
        let tied =
            EpochTally::from_counts(&[(ClassLabel::NoActivity, 25), (ClassLabel::GlassBreak, 5)]);
        let decision = decide_tally(tied, 5);
        assert_eq!(decision.label, ClassLabel::GlassBreak);
        assert_eq!(decision.kind, DecisionKind::TieBreak);
    }

    #[test]
    fn tie_break_priority_chain() {
        let cases = [
            (
                &[(ClassLabel::Footsteps, 2), (ClassLabel::Voices, 2)][..],
                ClassLabel::Footsteps,
            ),
            (
                &[(ClassLabel::Voices, 1), (ClassLabel::Other, 1)][..],
                ClassLabel::Voices,
            ),
            (
                &[(ClassLabel::NoActivity, 10), (ClassLabel::Other, 2)][..],
                ClassLabel::NoActivity,
            ),
            (
                &[(ClassLabel::GlassBreak, 1), (ClassLabel::Footsteps, 4), (ClassLabel::Other, 4)][..],
                ClassLabel::Footsteps,
            ),
        ];
        for (counts, expected) in cases {
            let decision = decide_tally(EpochTally::from_counts(counts), 5);
            assert_eq!(decision.label, expected, "tally {counts:?}");
            assert_eq!(decision.kind, DecisionKind::TieBreak);
        }
    }

    #[test]
    fn empty_tally_falls_through_to_priority() {
        // All zero is a tie like any other; the first priority label wins.
        let decision = decide_tally(EpochTally::default(), 5);
        assert_eq!(decision.label, ClassLabel::GlassBreak);
        assert_eq!(decision.kind, DecisionKind::TieBreak);
    }

    #[test]
    fn strict_majority_for_every_label() {
        for label in ClassLabel::ALL {
            // NoActivity needs 5x the windows to survive the down-weight.
            let count = if label == ClassLabel::NoActivity { 10 } else { 2 };
            let decision = decide_tally(EpochTally::from_counts(&[(label, count)]), 5);
            assert_eq!(decision.label, label);
            assert_eq!(decision.kind, DecisionKind::Majority);
        }
    }

    #[test]
    fn decide_resets_for_next_epoch() {
        let mut voter = VotingAggregator::new(4, 5);
        for _ in 0..4 {
            voter.increment(ClassLabel::Footsteps);
        }
        assert!(voter.is_complete());
        assert_eq!(voter.decide().label, ClassLabel::Footsteps);
        assert_eq!(voter.tally().total(), 0);
        assert!(!voter.is_complete());

        for _ in 0..4 {
            voter.increment(ClassLabel::NoActivity);
        }
        // 4 / 5 = 0 everywhere: tie, resolved to glass break (0 >= 0)
        let decision = voter.decide();
        assert_eq!(decision.label, ClassLabel::GlassBreak);
        assert_eq!(decision.kind, DecisionKind::TieBreak);
    }
}
