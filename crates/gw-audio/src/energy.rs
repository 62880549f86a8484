use gw_core::frame::Spectrum;

/// RMS gate over the magnitude spectrum.
///
/// The primary false-positive suppressor: a spectrum whose RMS is below the
/// threshold is "no activity" and never reaches the band classifier.
///
/// # Example
/// ```
/// use gw_audio::energy::EnergyGate;
/// use gw_core::frame::Spectrum;
/// let gate = EnergyGate::new(0.03);
/// let silence = Spectrum::new(1024);
/// assert_eq!(gate.rms(&silence), 0.0);
/// assert!(!gate.is_active(0.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EnergyGate {
    threshold: f32,
}

impl EnergyGate {
    /// Gate opening at `threshold` (inclusive).
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// `sqrt(sum(bin²) / len)`, 0 for an empty spectrum.
    #[must_use]
    pub fn rms(&self, spectrum: &Spectrum) -> f32 {
        let bins = spectrum.bins();
        if bins.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = bins.iter().map(|m| m * m).sum();
        (sum_sq / bins.len() as f32).sqrt()
    }

    /// `false` when `rms` is strictly below the threshold.
    #[inline(always)]
    #[must_use]
    pub fn is_active(&self, rms: f32) -> bool {
        rms >= self.threshold
    }

    /// Configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
