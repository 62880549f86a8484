use serde::{Deserialize, Serialize};

use crate::label::ClassLabel;

/// One frequency band of the classification table, bound to a label.
///
/// The lower bound is always inclusive; the upper bound is inclusive only
/// when `max_inclusive` is set.
///
/// # Example
/// ```
/// use gw_core::band::FrequencyBand;
/// use gw_core::label::ClassLabel;
/// let band = FrequencyBand::new("footsteps", 800, 1700, false, ClassLabel::Footsteps);
/// assert!(band.contains(800));
/// assert!(!band.contains(1700));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrequencyBand {
    /// Nom lisible pour les logs.
    pub name: String,
    /// Borne basse en Hz (incluse).
    pub min_hz: u32,
    /// Borne haute en Hz.
    pub max_hz: u32,
    /// `true` si `max_hz` appartient à la bande.
    #[serde(default)]
    pub max_inclusive: bool,
    /// Label produit quand la fréquence dominante tombe dans la bande.
    pub label: ClassLabel,
}

impl FrequencyBand {
    /// Build a band.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        min_hz: u32,
        max_hz: u32,
        max_inclusive: bool,
        label: ClassLabel,
    ) -> Self {
        Self {
            name: name.into(),
            min_hz,
            max_hz,
            max_inclusive,
            label,
        }
    }

    /// `true` if `hz` lies in the band.
    #[inline(always)]
    #[must_use]
    pub fn contains(&self, hz: u32) -> bool {
        hz >= self.min_hz && (hz < self.max_hz || (self.max_inclusive && hz == self.max_hz))
    }

    /// Exclusive upper bound, widened so an inclusive `u32::MAX` stays representable.
    #[must_use]
    pub fn end_exclusive(&self) -> u64 {
        u64::from(self.max_hz) + u64::from(self.max_inclusive)
    }

    /// `true` if the band matches no frequency at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        u64::from(self.min_hz) >= self.end_exclusive()
    }

    fn overlaps(&self, other: &FrequencyBand) -> bool {
        u64::from(self.min_hz) < other.end_exclusive()
            && u64::from(other.min_hz) < self.end_exclusive()
    }

    fn covers(&self, other: &FrequencyBand) -> bool {
        self.min_hz <= other.min_hz && self.end_exclusive() >= other.end_exclusive()
    }
}

/// Table ordonnée de bandes, évaluée en first-match-wins.
///
/// Les chevauchements sont conservés tels quels : l'ordre d'évaluation fait
/// la précédence. [`BandTable::overlaps`] et [`BandTable::shadowed`] les
/// exposent pour que l'application puisse les signaler.
///
/// # Example
/// ```
/// use gw_core::band::BandTable;
/// use gw_core::label::ClassLabel;
/// let table = BandTable::default();
/// // 2000 Hz matches both glass-break and mosquito; glass-break is listed first.
/// assert_eq!(table.classify(2000), ClassLabel::GlassBreak);
/// assert_eq!(table.classify(440), ClassLabel::Voices);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BandTable {
    /// Bands in evaluation order.
    pub bands: Vec<FrequencyBand>,
    /// Label returned when no band matches.
    #[serde(default)]
    pub fallback: ClassLabel,
}

impl BandTable {
    /// First band containing `hz`, if any.
    #[must_use]
    pub fn find(&self, hz: u32) -> Option<&FrequencyBand> {
        self.bands.iter().find(|band| band.contains(hz))
    }

    /// Label for `hz`: first matching band, else the fallback.
    #[must_use]
    pub fn classify(&self, hz: u32) -> ClassLabel {
        self.find(hz).map_or(self.fallback, |band| band.label)
    }

    /// Every pair `(earlier, later)` of bands whose ranges intersect.
    #[must_use]
    pub fn overlaps(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.bands.iter().enumerate() {
            for (j, b) in self.bands.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Indices of bands that can never match because a single earlier band
    /// covers their whole range.
    #[must_use]
    pub fn shadowed(&self) -> Vec<usize> {
        self.bands
            .iter()
            .enumerate()
            .filter(|(j, band)| self.bands[..*j].iter().any(|earlier| earlier.covers(band)))
            .map(|(j, _)| j)
            .collect()
    }
}

impl Default for BandTable {
    fn default() -> Self {
        Self {
            bands: vec![
                FrequencyBand::new("sub-audible", 0, 20, false, ClassLabel::NoActivity),
                FrequencyBand::new("glass-break", 1700, 20_000, true, ClassLabel::GlassBreak),
                FrequencyBand::new("mosquito", 1700, 2800, true, ClassLabel::Other),
                FrequencyBand::new("footsteps", 800, 1700, false, ClassLabel::Footsteps),
                FrequencyBand::new("voices", 20, 800, false, ClassLabel::Voices),
            ],
            fallback: ClassLabel::NoActivity,
        }
    }
}
