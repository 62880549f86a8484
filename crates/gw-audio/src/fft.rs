use std::sync::Arc;

use gw_core::config::{DetectorConfig, WindowKind};
use gw_core::error::CoreError;
use gw_core::frame::{NormalizedFrame, Spectrum};
use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

/// Spectral transform: real FFT of one frame reduced to magnitudes.
///
/// Pre-allocates the FFT plan and scratch buffers for zero-allocation hot path.
/// Bin 0 and every bin below the low-frequency cutoff are zeroed; the
/// magnitudes are raw (no 1/N normalization).
///
/// # Example
/// ```
/// use gw_audio::fft::SpectralTransform;
/// use gw_core::config::DetectorConfig;
/// let fft = SpectralTransform::from_config(&DetectorConfig::default()).unwrap();
/// assert_eq!(fft.frame_size(), 1024);
/// ```
pub struct SpectralTransform {
    frame_size: usize,
    cutoff_bins: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    plan: Arc<dyn RealToComplex<f32>>,
    /// Window coefficients, `None` for rectangular.
    window: Option<Vec<f32>>,
}

impl SpectralTransform {
    /// Plan a transform of `frame_size` points zeroing the first `cutoff_bins` bins.
    ///
    /// # Errors
    /// Returns [`CoreError::UnsupportedFrameSize`] if `frame_size` is odd or < 2.
    pub fn new(frame_size: usize, cutoff_bins: usize, window: WindowKind) -> Result<Self, CoreError> {
        if frame_size < 2 || frame_size % 2 != 0 {
            return Err(CoreError::UnsupportedFrameSize { size: frame_size });
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(frame_size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        let window = match window {
            WindowKind::Rectangular => None,
            // Hann window
            WindowKind::Hann => Some(
                (0..frame_size)
                    .map(|i| {
                        0.5 * (1.0
                            - (2.0 * std::f32::consts::PI * i as f32 / (frame_size as f32 - 1.0))
                                .cos())
                    })
                    .collect(),
            ),
        };

        Ok(Self {
            frame_size,
            cutoff_bins: cutoff_bins.clamp(1, frame_size / 2),
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window,
        })
    }

    /// Plan the transform described by `config`.
    ///
    /// # Errors
    /// Returns [`CoreError::UnsupportedFrameSize`] if the configured frame size is unusable.
    pub fn from_config(config: &DetectorConfig) -> Result<Self, CoreError> {
        Self::new(config.frame_size, config.cutoff_bins(), config.window)
    }

    /// Transform `frame` into `out` (`frame_size / 2` magnitudes).
    ///
    /// # Example
    /// ```
    /// use gw_audio::fft::SpectralTransform;
    /// use gw_core::config::WindowKind;
    /// use gw_core::frame::{NormalizedFrame, Spectrum};
    ///
    /// let mut fft = SpectralTransform::new(256, 1, WindowKind::Rectangular).unwrap();
    /// let mut frame = NormalizedFrame::new(256);
    /// frame.samples_mut().fill(0.5); // pure DC
    /// let mut spectrum = Spectrum::new(256);
    /// fft.process(&frame, &mut spectrum);
    /// assert_eq!(spectrum.len(), 128);
    /// assert!(spectrum.bins().iter().all(|&m| m < 1e-3));
    /// ```
    pub fn process(&mut self, frame: &NormalizedFrame, out: &mut Spectrum) {
        debug_assert_eq!(frame.len(), self.frame_size, "frame length mismatch");
        debug_assert_eq!(out.len(), self.frame_size / 2, "spectrum length mismatch");

        // Copy (and window)
        match &self.window {
            Some(window) => {
                for ((slot, &s), &w) in self.input_buf.iter_mut().zip(frame.samples()).zip(window) {
                    *slot = s * w;
                }
            }
            None => self.input_buf.copy_from_slice(frame.samples()),
        }

        // Forward FFT. Only fails on buffer lengths, which the plan fixed.
        let result = self.plan.process_with_scratch(
            &mut self.input_buf,
            &mut self.spectrum_buf,
            &mut self.scratch,
        );
        debug_assert!(result.is_ok(), "FFT buffers out of sync with plan: {result:?}");
        if let Err(e) = result {
            log::error!("FFT failed: {e}");
            out.bins_mut().fill(0.0);
            return;
        }

        // Magnitude, Nyquist bin dropped
        for (slot, c) in out.bins_mut().iter_mut().zip(&self.spectrum_buf) {
            *slot = (c.re * c.re + c.im * c.im).sqrt();
        }

        // DC + sub-audible
        let cutoff = self.cutoff_bins.min(out.len());
        out.bins_mut()[..cutoff].fill(0.0);
    }

    /// FFT window size.
    #[must_use]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of leading bins forced to zero.
    #[must_use]
    pub fn cutoff_bins(&self) -> usize {
        self.cutoff_bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gw_core::frame::bin_frequency;

    #[test]
    fn buffers_are_sized_by_the_plan() {
        for frame_size in [2usize, 256, 1000, 1024] {
            let fft = SpectralTransform::new(frame_size, 1, WindowKind::Hann).unwrap();
            assert_eq!(fft.input_buf.len(), fft.plan.len());
            assert_eq!(fft.spectrum_buf.len(), frame_size / 2 + 1);
            assert_eq!(fft.scratch.len(), fft.plan.get_scratch_len());
            assert_eq!(fft.window.as_ref().map(Vec::len), Some(frame_size));
        }
    }

    fn sine(frame_size: usize, sample_rate: u32, hz: f32, amplitude: f32) -> NormalizedFrame {
        let mut frame = NormalizedFrame::new(frame_size);
        for (i, s) in frame.samples_mut().iter_mut().enumerate() {
            *s = amplitude
                * (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate as f32).sin();
        }
        frame
    }

    #[test]
    fn odd_or_tiny_sizes_are_rejected() {
        assert!(SpectralTransform::new(0, 1, WindowKind::Rectangular).is_err());
        assert!(SpectralTransform::new(1, 1, WindowKind::Rectangular).is_err());
        assert!(SpectralTransform::new(1023, 1, WindowKind::Rectangular).is_err());
        assert!(SpectralTransform::new(1000, 1, WindowKind::Rectangular).is_ok());
    }

    #[test]
    fn sub_cutoff_bins_are_exactly_zero() {
        let config = DetectorConfig::default();
        let mut fft = SpectralTransform::from_config(&config).unwrap();
        // Broadband content: an impulse plus a DC offset.
        let mut frame = NormalizedFrame::new(config.frame_size);
        frame.samples_mut().fill(0.25);
        frame.samples_mut()[3] = 1.0;
        let mut spectrum = Spectrum::new(config.frame_size);
        fft.process(&frame, &mut spectrum);

        for (bin, &mag) in spectrum.bins().iter().enumerate() {
            let hz = bin_frequency(bin, config.sample_rate, config.frame_size);
            if bin == 0 || hz < config.low_freq_cutoff_hz {
                assert_eq!(mag, 0.0, "bin {bin} ({hz} Hz) not zeroed");
            } else {
                assert!(mag > 0.0, "bin {bin} unexpectedly empty");
            }
        }
    }

    #[test]
    fn transform_is_deterministic() {
        let mut fft = SpectralTransform::new(1024, 2, WindowKind::Rectangular).unwrap();
        let frame = sine(1024, 16447, 440.0, 0.3);
        let mut a = Spectrum::new(1024);
        let mut b = Spectrum::new(1024);
        fft.process(&frame, &mut a);
        fft.process(&frame, &mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn sine_peaks_at_expected_bin() {
        let mut fft = SpectralTransform::new(1024, 2, WindowKind::Rectangular).unwrap();
        let frame = sine(1024, 16447, 3000.0, 0.5);
        let mut spectrum = Spectrum::new(1024);
        fft.process(&frame, &mut spectrum);
        let (bin, value) = spectrum.argmax();
        assert_eq!(bin, 187);
        // Un-normalized: a 0.5 sine over 1024 points peaks in the low hundreds.
        assert!(value > 100.0, "peak magnitude {value}");
    }

    #[test]
    fn hann_window_keeps_the_peak() {
        let mut fft = SpectralTransform::new(1024, 2, WindowKind::Hann).unwrap();
        let frame = sine(1024, 16447, 1000.0, 0.5);
        let mut spectrum = Spectrum::new(1024);
        fft.process(&frame, &mut spectrum);
        let (bin, _) = spectrum.argmax();
        // 1000 * 1024 / 16447 = 62.26
        assert_eq!(bin, 62);
    }
}
