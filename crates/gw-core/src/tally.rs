use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::label::ClassLabel;

/// Compteur par label, cumulé sur une époque puis consommé par le vote.
///
/// # Example
/// ```
/// use gw_core::label::ClassLabel;
/// use gw_core::tally::EpochTally;
/// let mut tally = EpochTally::default();
/// tally.increment(ClassLabel::Voices);
/// tally.increment(ClassLabel::Voices);
/// assert_eq!(tally.get(ClassLabel::Voices), 2);
/// assert_eq!(tally.total(), 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpochTally {
    counts: [u32; ClassLabel::COUNT],
}

impl EpochTally {
    /// Build a tally from explicit `(label, count)` pairs; unlisted labels are zero.
    ///
    /// # Example
    /// ```
    /// use gw_core::label::ClassLabel;
    /// use gw_core::tally::EpochTally;
    /// let tally = EpochTally::from_counts(&[(ClassLabel::GlassBreak, 3), (ClassLabel::Footsteps, 3)]);
    /// assert_eq!(tally.get(ClassLabel::GlassBreak), 3);
    /// assert_eq!(tally.get(ClassLabel::Voices), 0);
    /// ```
    #[must_use]
    pub fn from_counts(counts: &[(ClassLabel, u32)]) -> Self {
        let mut tally = Self::default();
        for &(label, count) in counts {
            tally.set(label, count);
        }
        tally
    }

    /// Count one more sub-window for `label`.
    #[inline(always)]
    pub fn increment(&mut self, label: ClassLabel) {
        let slot = &mut self.counts[label.index()];
        *slot = slot.saturating_add(1);
    }

    /// Current count for `label`.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, label: ClassLabel) -> u32 {
        self.counts[label.index()]
    }

    /// Overwrite the count for `label`.
    pub fn set(&mut self, label: ClassLabel, count: u32) {
        self.counts[label.index()] = count;
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().fold(0u32, |acc, &c| acc.saturating_add(c))
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        self.counts = [0; ClassLabel::COUNT];
    }
}

impl Serialize for EpochTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ClassLabel::COUNT))?;
        for label in ClassLabel::ALL {
            map.serialize_entry(&label, &self.get(label))?;
        }
        map.end()
    }
}

/// How the epoch decision was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum DecisionKind {
    /// One label had a strictly greater tally than every other.
    Majority,
    /// Tallies were tied at the top; the fixed priority order decided.
    TieBreak,
}

/// Résultat du vote d'une époque.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Decision {
    /// Winning label.
    pub label: ClassLabel,
    /// Majority or tie-break.
    pub kind: DecisionKind,
    /// Tally after the NoActivity down-weighting, as used for the decision.
    pub weighted: EpochTally,
}
