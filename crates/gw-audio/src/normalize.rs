use gw_core::frame::{Frame, NormalizedFrame};

/// Converts raw integer samples to floats in [-1, 1].
///
/// `normalized[i] = raw[i] / max_raw_magnitude`, clamped so that `i32::MIN`
/// and samples above a narrower configured magnitude stay in range.
///
/// # Example
/// ```
/// use gw_audio::normalize::FrameNormalizer;
/// use gw_core::frame::{Frame, NormalizedFrame};
///
/// let normalizer = FrameNormalizer::new(1024);
/// let mut raw = Frame::new(4);
/// raw.samples_mut().copy_from_slice(&[0, 512, -1024, 4096]);
/// let mut out = NormalizedFrame::new(4);
/// normalizer.normalize(&raw, &mut out);
/// assert_eq!(out.samples(), &[0.0, 0.5, -1.0, 1.0]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FrameNormalizer {
    scale: f32,
}

impl FrameNormalizer {
    /// Normalizer for samples whose full scale is `max_raw_magnitude`.
    #[must_use]
    pub fn new(max_raw_magnitude: u32) -> Self {
        Self {
            scale: 1.0 / max_raw_magnitude.max(1) as f32,
        }
    }

    /// Scale factor applied to each raw sample.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Write `raw` into `out`. Both have the frame size fixed at construction.
    #[inline]
    pub fn normalize(&self, raw: &Frame, out: &mut NormalizedFrame) {
        debug_assert_eq!(raw.len(), out.len(), "frame length mismatch");
        for (slot, &sample) in out.samples_mut().iter_mut().zip(raw.samples()) {
            *slot = (sample as f32 * self.scale).clamp(-1.0, 1.0);
        }
    }
}

impl Default for FrameNormalizer {
    fn default() -> Self {
        Self::new(i32::MAX as u32)
    }
}
