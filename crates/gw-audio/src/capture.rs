use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use flume::{Receiver, RecvTimeoutError, Sender};
use rtrb::{Consumer, Producer, RingBuffer};

use gw_core::error::CaptureError;
use gw_core::frame::Frame;
use gw_core::traits::SampleSource;

/// Max wait between two wake-ups before re-checking the error channel.
const WAKE_TIMEOUT: Duration = Duration::from_millis(250);

/// Capture micro via cpal.
///
/// Le callback audio convertit en mono i32 pleine échelle et pousse dans un
/// ring buffer lock-free, puis réveille le consommateur. `acquire` bloque
/// jusqu'à ce qu'une frame complète soit disponible.
///
/// # Example
/// ```no_run
/// use gw_audio::capture::MicSource;
/// use gw_core::frame::Frame;
/// use gw_core::traits::SampleSource;
///
/// let mut mic = MicSource::start_default().unwrap();
/// let mut frame = Frame::new(1024);
/// mic.acquire(&mut frame).unwrap();
/// ```
pub struct MicSource {
    stream: cpal::Stream,
    consumer: Consumer<i32>,
    wake_rx: Receiver<()>,
    error_rx: Receiver<String>,
    sample_rate: u32,
}

impl MicSource {
    /// Start capturing from the default input device at its default rate.
    ///
    /// # Errors
    /// Returns an error if no input device is available or the stream
    /// cannot be built or started.
    pub fn start_default() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = usize::from(config.channels()).max(1);

        // 2 s de marge @ sample_rate
        let (mut producer, consumer) = RingBuffer::new(sample_rate as usize * 2);
        let (wake_tx, wake_rx) = flume::bounded(1);
        let (error_tx, error_rx) = flume::unbounded();

        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    push_mono(&mut producer, data, channels);
                    wake(&wake_tx);
                },
                move |err| {
                    let _ = error_tx.send(err.to_string());
                },
                None,
            )
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::Stream(e.to_string()))?;

        log::info!(
            "Capture micro : {} @ {sample_rate} Hz, {channels} canal(aux)",
            device.name().unwrap_or_else(|_| "inconnu".into())
        );

        Ok(Self {
            stream,
            consumer,
            wake_rx,
            error_rx,
            sample_rate,
        })
    }

    /// Reference to the underlying cpal stream (kept alive for capture).
    pub fn stream(&self) -> &cpal::Stream {
        &self.stream
    }
}

impl SampleSource for MicSource {
    fn acquire(&mut self, frame: &mut Frame) -> Result<(), CaptureError> {
        let mut filled = 0;
        loop {
            filled = drain_into(&mut self.consumer, frame.samples_mut(), filled);
            if filled == frame.len() {
                return Ok(());
            }
            if let Ok(msg) = self.error_rx.try_recv() {
                return Err(CaptureError::Stream(msg));
            }
            match self.wake_rx.recv_timeout(WAKE_TIMEOUT) {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::Disconnected),
            }
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn discard_buffered(&mut self) {
        let dropped = drop_stale(&mut self.consumer);
        while self.wake_rx.try_recv().is_ok() {}
        if dropped > 0 {
            log::trace!("{dropped} échantillons périmés ignorés");
        }
    }
}

/// Downmix interleaved `data` to mono full-scale i32 and push it.
///
/// Samples that do not fit are dropped; the callback never blocks.
fn push_mono(producer: &mut Producer<i32>, data: &[f32], channels: usize) {
    for chunk in data.chunks(channels) {
        let mono: f32 = chunk.iter().sum::<f32>() / chunk.len() as f32;
        let _ = producer.push(to_full_scale(mono));
    }
}

/// Signal the consumer. A pending wake-up already covers this one.
fn wake(wake_tx: &Sender<()>) {
    let _ = wake_tx.try_send(());
}

#[inline(always)]
fn to_full_scale(sample: f32) -> i32 {
    // `as` sature : +1.0 donne i32::MAX
    (f64::from(sample.clamp(-1.0, 1.0)) * f64::from(i32::MAX)) as i32
}

/// Empty the ring of everything pushed so far. Returns how many samples went.
fn drop_stale(consumer: &mut Consumer<i32>) -> usize {
    let stale = consumer.slots();
    match consumer.read_chunk(stale) {
        Ok(chunk) => {
            chunk.commit_all();
            stale
        }
        Err(_) => 0,
    }
}

/// Pop into `out[filled..]` until `out` is full or the buffer is empty.
/// Returns the new fill level.
fn drain_into(consumer: &mut Consumer<i32>, out: &mut [i32], mut filled: usize) -> usize {
    while filled < out.len() {
        match consumer.pop() {
            Ok(sample) => {
                out[filled] = sample;
                filled += 1;
            }
            Err(_) => break,
        }
    }
    filled
}
