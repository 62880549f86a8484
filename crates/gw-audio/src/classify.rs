use gw_core::band::BandTable;
use gw_core::config::DetectorConfig;
use gw_core::frame::{Spectrum, bin_frequency};
use gw_core::label::ClassLabel;

/// Résultat de la classification d'une sous-fenêtre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    /// Label for this sub-window.
    pub label: ClassLabel,
    /// Spectral RMS measured by the gate.
    pub rms: f32,
    /// Dominant bin and its frequency, `None` when the gate short-circuited.
    pub peak: Option<Peak>,
}

/// Dominant spectral component of an active sub-window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// Index of the largest bin.
    pub bin: usize,
    /// Its frequency in whole Hz.
    pub hz: u32,
    /// Its magnitude.
    pub magnitude: f32,
}

impl Classification {
    /// Gated-out sub-window.
    #[must_use]
    pub fn silent(rms: f32) -> Self {
        Self {
            label: ClassLabel::NoActivity,
            rms,
            peak: None,
        }
    }
}

/// Maps the dominant frequency of a gated spectrum to a label.
///
/// The spectrum must already have DC and sub-cutoff bins zeroed. Always
/// returns a label: the band table falls back when no band matches.
///
/// # Example
/// ```
/// use gw_audio::classify::BandClassifier;
/// use gw_core::config::DetectorConfig;
/// use gw_core::frame::Spectrum;
/// use gw_core::label::ClassLabel;
///
/// let classifier = BandClassifier::from_config(&DetectorConfig::default());
/// let mut spectrum = Spectrum::new(1024);
/// spectrum.bins_mut()[187] = 200.0; // ~3003 Hz
/// let peak = classifier.dominant(&spectrum);
/// assert_eq!(peak.hz, 3003);
/// assert_eq!(classifier.label_for(peak.hz), ClassLabel::GlassBreak);
/// ```
#[derive(Clone, Debug)]
pub struct BandClassifier {
    table: BandTable,
    sample_rate: u32,
    frame_size: usize,
}

impl BandClassifier {
    /// Classifier over `table` for a `frame_size`-point transform at `sample_rate`.
    #[must_use]
    pub fn new(table: BandTable, sample_rate: u32, frame_size: usize) -> Self {
        Self {
            table,
            sample_rate,
            frame_size,
        }
    }

    /// Classifier built from the configured band table.
    #[must_use]
    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.bands.clone(), config.sample_rate, config.frame_size)
    }

    /// Largest bin of `spectrum` and its frequency.
    #[must_use]
    pub fn dominant(&self, spectrum: &Spectrum) -> Peak {
        let (bin, magnitude) = spectrum.argmax();
        Peak {
            bin,
            hz: bin_frequency(bin, self.sample_rate, self.frame_size),
            magnitude,
        }
    }

    /// First matching band's label for `hz`.
    #[inline]
    #[must_use]
    pub fn label_for(&self, hz: u32) -> ClassLabel {
        self.table.classify(hz)
    }

    /// Dominant peak plus its label.
    #[must_use]
    pub fn classify(&self, spectrum: &Spectrum) -> (Peak, ClassLabel) {
        let peak = self.dominant(spectrum);
        (peak, self.label_for(peak.hz))
    }

    /// Band table in evaluation order.
    #[must_use]
    pub fn table(&self) -> &BandTable {
        &self.table
    }
}
