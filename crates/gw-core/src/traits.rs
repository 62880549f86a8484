use std::time::Duration;

use crate::error::CaptureError;
use crate::frame::Frame;
use crate::report::EpochReport;

/// Fournit une frame complète d'échantillons bruts par appel.
///
/// Implémenté par : `MicSource`, `FileSource`, `ToneSource`.
///
/// # Example
/// ```
/// use gw_core::traits::SampleSource;
/// use gw_core::frame::Frame;
/// use gw_core::error::CaptureError;
///
/// struct Silence;
/// impl SampleSource for Silence {
///     fn acquire(&mut self, frame: &mut Frame) -> Result<(), CaptureError> {
///         frame.samples_mut().fill(0);
///         Ok(())
///     }
///     fn sample_rate(&self) -> u32 { 16447 }
/// }
/// ```
pub trait SampleSource {
    /// Remplit `frame` entièrement. BLOQUE jusqu'à ce que la frame soit pleine.
    ///
    /// # Errors
    /// Any capture failure. The caller treats it as fatal and never retries.
    fn acquire(&mut self, frame: &mut Frame) -> Result<(), CaptureError>;

    /// Effective sample rate of the delivered samples, in Hz.
    fn sample_rate(&self) -> u32;

    /// Drop samples buffered before now, so the next frame starts with
    /// live audio. Called once at the start of every epoch.
    ///
    /// Sources that produce on demand have nothing to drop.
    fn discard_buffered(&mut self) {}
}

/// Suspend l'exécution entre deux époques.
///
/// # Example
/// ```
/// use gw_core::traits::IdleWait;
/// use std::time::Duration;
///
/// struct NoWait;
/// impl IdleWait for NoWait {
///     fn wait(&mut self, _duration: Duration) {}
/// }
/// ```
pub trait IdleWait {
    /// Block for `duration`. Not cancellable.
    fn wait(&mut self, duration: Duration);
}

/// Receives one report per completed epoch. Push only, no acknowledgement.
///
/// # Example
/// ```
/// use gw_core::traits::Reporter;
/// use gw_core::report::EpochReport;
///
/// struct Discard;
/// impl Reporter for Discard {
///     fn report(&mut self, _report: &EpochReport) {}
/// }
/// ```
pub trait Reporter {
    /// Publish `report`.
    fn report(&mut self, report: &EpochReport);
}

/// Compteur monotone de ticks (équivalent du compteur de cycles matériel).
///
/// Les deltas se calculent avec `wrapping_sub` : un compteur qui reboucle
/// reste utilisable.
pub trait CycleCounter {
    /// Current tick count.
    fn now(&self) -> u64;

    /// Ticks per second.
    fn frequency_hz(&self) -> f64;
}

impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    fn acquire(&mut self, frame: &mut Frame) -> Result<(), CaptureError> {
        (**self).acquire(frame)
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn discard_buffered(&mut self) {
        (**self).discard_buffered();
    }
}

impl<T: Reporter + ?Sized> Reporter for Box<T> {
    fn report(&mut self, report: &EpochReport) {
        (**self).report(report);
    }
}
