use gw_core::error::CaptureError;
use gw_core::frame::Frame;
use gw_core::traits::SampleSource;

/// Générateur sinusoïdal : source synthétique pour les démos et les benchs.
///
/// La phase est continue d'une frame à l'autre.
///
/// # Example
/// ```
/// use gw_audio::tone::ToneSource;
/// use gw_core::frame::Frame;
/// use gw_core::traits::SampleSource;
///
/// let mut tone = ToneSource::new(3000.0, 0.5, 16447);
/// let mut frame = Frame::new(1024);
/// tone.acquire(&mut frame).unwrap();
/// assert!(frame.samples().iter().any(|&s| s != 0));
/// ```
#[derive(Clone, Debug)]
pub struct ToneSource {
    frequency_hz: f64,
    amplitude: f64,
    sample_rate: u32,
    position: u64,
}

impl ToneSource {
    /// Sine at `frequency_hz`, `amplitude` in [0, 1] of full scale.
    #[must_use]
    pub fn new(frequency_hz: f64, amplitude: f64, sample_rate: u32) -> Self {
        Self {
            frequency_hz,
            amplitude: amplitude.clamp(0.0, 1.0),
            sample_rate: sample_rate.max(1),
            position: 0,
        }
    }

    /// Digital silence.
    #[must_use]
    pub fn silence(sample_rate: u32) -> Self {
        Self::new(0.0, 0.0, sample_rate)
    }
}

impl SampleSource for ToneSource {
    fn acquire(&mut self, frame: &mut Frame) -> Result<(), CaptureError> {
        let step = 2.0 * std::f64::consts::PI * self.frequency_hz / f64::from(self.sample_rate);
        let full_scale = f64::from(i32::MAX);
        for slot in frame.samples_mut() {
            let phase = step * self.position as f64;
            *slot = (self.amplitude * phase.sin() * full_scale) as i32;
            self.position = (self.position + 1) % u64::from(self.sample_rate);
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_all_zero() {
        let mut source = ToneSource::silence(16447);
        let mut frame = Frame::new(256);
        frame.samples_mut().fill(7);
        source.acquire(&mut frame).unwrap();
        assert!(frame.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn amplitude_is_bounded() {
        let mut source = ToneSource::new(440.0, 2.0, 16000);
        let mut frame = Frame::new(1024);
        source.acquire(&mut frame).unwrap();
        let peak = frame.samples().iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > i32::MAX as u32 / 2);
    }
}
