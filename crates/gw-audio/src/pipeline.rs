use gw_core::config::DetectorConfig;
use gw_core::error::CoreError;
use gw_core::frame::{Frame, NormalizedFrame, Spectrum};
use gw_core::timing::{Stage, TimingAccumulator};
use gw_core::traits::CycleCounter;

use crate::classify::{BandClassifier, Classification};
use crate::energy::EnergyGate;
use crate::fft::SpectralTransform;
use crate::normalize::FrameNormalizer;

/// Per-frame processing: normalize → transform → gate → classify.
///
/// Owns every intermediate buffer; nothing is allocated after construction.
///
/// # Example
/// ```
/// use gw_audio::pipeline::FramePipeline;
/// use gw_core::config::DetectorConfig;
/// use gw_core::frame::Frame;
/// use gw_core::label::ClassLabel;
/// use gw_core::timing::{NoopCounter, TimingAccumulator};
///
/// let config = DetectorConfig::default();
/// let mut pipeline = FramePipeline::new(&config).unwrap();
/// let silence = Frame::new(config.frame_size);
/// let mut timing = TimingAccumulator::default();
/// let result = pipeline.process(&silence, &mut timing, &NoopCounter);
/// assert_eq!(result.label, ClassLabel::NoActivity);
/// assert_eq!(result.rms, 0.0);
/// ```
pub struct FramePipeline {
    normalizer: FrameNormalizer,
    transform: SpectralTransform,
    gate: EnergyGate,
    classifier: BandClassifier,
    normalized: NormalizedFrame,
    spectrum: Spectrum,
}

impl FramePipeline {
    /// Build every stage and buffer from `config`.
    ///
    /// # Errors
    /// Returns an error if the spectral transform rejects the frame size.
    pub fn new(config: &DetectorConfig) -> Result<Self, CoreError> {
        Ok(Self {
            normalizer: FrameNormalizer::new(config.max_raw_magnitude),
            transform: SpectralTransform::from_config(config)?,
            gate: EnergyGate::new(config.activity_threshold),
            classifier: BandClassifier::from_config(config),
            normalized: NormalizedFrame::new(config.frame_size),
            spectrum: Spectrum::new(config.frame_size),
        })
    }

    /// Classify one frame, adding each stage's elapsed ticks to `timing`.
    ///
    /// Normalization is charged to [`Stage::Acquisition`].
    pub fn process(
        &mut self,
        frame: &Frame,
        timing: &mut TimingAccumulator,
        counter: &dyn CycleCounter,
    ) -> Classification {
        let start = counter.now();
        self.normalizer.normalize(frame, &mut self.normalized);
        timing.record_since(Stage::Acquisition, counter, start);

        let start = counter.now();
        self.transform.process(&self.normalized, &mut self.spectrum);
        timing.record_since(Stage::Transform, counter, start);

        let start = counter.now();
        let rms = self.gate.rms(&self.spectrum);
        let active = self.gate.is_active(rms);
        timing.record_since(Stage::Energy, counter, start);

        if !active {
            return Classification::silent(rms);
        }

        let start = counter.now();
        let (peak, label) = self.classifier.classify(&self.spectrum);
        timing.record_since(Stage::Classification, counter, start);

        log::trace!(
            "peak bin {} ({} Hz, {:.3}) rms {rms:.4} -> {label:?}",
            peak.bin,
            peak.hz,
            peak.magnitude
        );

        Classification {
            label,
            rms,
            peak: Some(peak),
        }
    }

    /// Spectrum of the last processed frame.
    #[must_use]
    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    /// Frame size the buffers were sized for.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.transform.frame_size()
    }
}
