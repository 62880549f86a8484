use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use gw_core::error::CaptureError;
use gw_core::frame::Frame;
use gw_core::traits::SampleSource;

/// Decode an audio file into mono full-scale i32 samples at its native rate.
///
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia. Corrupt packets are
/// skipped; any other decoder failure aborts.
///
/// # Errors
/// Returns an error if the file cannot be opened, probed or decoded.
///
/// # Example
/// ```no_run
/// use gw_audio::decode::decode_file;
/// let (samples, sample_rate) = decode_file("capture.wav").unwrap();
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<(Vec<i32>, u32)> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let track = reader
        .default_track()
        .context("Aucune piste audio par défaut")?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Piste sans fréquence d'échantillonnage")?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Codec non supporté")?;

    let mut mixer = MonoMixer::default();
    let mut mono = Vec::new();
    let mut skipped = 0usize;

    while let Some(packet) = next_packet(reader.as_mut())? {
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => mixer.append(decoded, &mut mono),
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("Paquet corrompu ignoré : {msg}");
                skipped += 1;
            }
            Err(e) => return Err(e).context("Décodage interrompu"),
        }
    }

    if skipped > 0 {
        log::warn!("{skipped} paquet(s) corrompu(s) ignoré(s) dans {}", path.display());
    }
    log::info!(
        "Décodé : {} échantillons @ {sample_rate} Hz depuis {}",
        mono.len(),
        path.display()
    );
    Ok((mono, sample_rate))
}

fn open_reader(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file =
        File::open(path).with_context(|| format!("Impossible d'ouvrir {}", path.display()))?;
    let stream = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .with_context(|| format!("Format audio non reconnu : {}", path.display()))?;
    Ok(probed.format)
}

/// Next packet, or `None` at end of stream.
fn next_packet(reader: &mut dyn FormatReader) -> Result<Option<Packet>> {
    match reader.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(None)
        }
        // Chained streams: treat a track change as the end of the capture.
        Err(SymphoniaError::ResetRequired) => Ok(None),
        Err(e) => Err(e).context("Lecture de paquet impossible"),
    }
}

/// Interleaved-to-mono conversion with a reusable sample buffer.
#[derive(Default)]
struct MonoMixer {
    buf: Option<SampleBuffer<i32>>,
    frames: usize,
}

impl MonoMixer {
    fn append(&mut self, decoded: AudioBufferRef<'_>, out: &mut Vec<i32>) {
        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let frames = decoded.capacity();
        if frames > self.frames || self.buf.is_none() {
            self.buf = Some(SampleBuffer::new(frames as u64, spec));
            self.frames = frames;
        }
        let Some(buf) = self.buf.as_mut() else {
            return;
        };
        buf.copy_interleaved_ref(decoded);
        out.extend(buf.samples().chunks(channels).map(downmix));
    }
}

/// Mean of one interleaved frame, widened to avoid overflow.
#[inline(always)]
fn downmix(chunk: &[i32]) -> i32 {
    let sum: i64 = chunk.iter().map(|&s| i64::from(s)).sum();
    (sum / chunk.len() as i64) as i32
}

/// Rejoue un fichier décodé, frame par frame.
///
/// En fin de fichier : reboucle si `looping`, sinon [`CaptureError::Exhausted`].
/// Une frame finale incomplète n'est jamais livrée.
///
/// # Example
/// ```
/// use gw_audio::decode::FileSource;
/// use gw_core::error::CaptureError;
/// use gw_core::frame::Frame;
/// use gw_core::traits::SampleSource;
///
/// let mut source = FileSource::from_samples(vec![1, 2, 3, 4, 5], 8000, false);
/// let mut frame = Frame::new(2);
/// source.acquire(&mut frame).unwrap();
/// source.acquire(&mut frame).unwrap();
/// assert_eq!(frame.samples(), &[3, 4]);
/// assert!(matches!(source.acquire(&mut frame), Err(CaptureError::Exhausted)));
/// ```
#[derive(Clone, Debug)]
pub struct FileSource {
    samples: Vec<i32>,
    position: usize,
    sample_rate: u32,
    looping: bool,
}

impl FileSource {
    /// Decode `path` and replay it.
    ///
    /// # Errors
    /// Returns an error if decoding fails.
    pub fn open(path: impl AsRef<Path>, looping: bool) -> Result<Self> {
        let (samples, sample_rate) = decode_file(path)?;
        Ok(Self::from_samples(samples, sample_rate, looping))
    }

    /// Replay already-decoded mono samples.
    #[must_use]
    pub fn from_samples(samples: Vec<i32>, sample_rate: u32, looping: bool) -> Self {
        Self {
            samples,
            position: 0,
            sample_rate,
            looping,
        }
    }

    /// Total decoded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if nothing was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SampleSource for FileSource {
    fn acquire(&mut self, frame: &mut Frame) -> Result<(), CaptureError> {
        let out = frame.samples_mut();
        let remaining = self.samples.len() - self.position;

        if remaining >= out.len() {
            out.copy_from_slice(&self.samples[self.position..self.position + out.len()]);
            self.position += out.len();
            return Ok(());
        }
        if !self.looping || self.samples.is_empty() {
            return Err(CaptureError::Exhausted);
        }

        // Reboucle : la frame enjambe la fin du fichier
        for slot in out.iter_mut() {
            if self.position == self.samples.len() {
                self.position = 0;
            }
            *slot = self.samples[self.position];
            self.position += 1;
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
    use std::io::Write;

    /// Minimal 16-bit PCM WAV.
    fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let block_align = channels * 2;
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    #[test]
    fn decodes_stereo_wav_to_mono() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        // 3 frames L/R
        let pcm = [i16::MAX, i16::MAX, 0, 0, 1000, -1000];
        file.write_all(&wav_bytes(16000, 2, &pcm)).unwrap();
        file.flush().unwrap();

        let (samples, rate) = decode_file(file.path()).unwrap();
        assert_eq!(rate, 16000);
        assert_eq!(samples.len(), 3);
        assert!(samples[0] > i32::MAX / 2);
        assert_eq!(samples[1], 0);
        assert_eq!(samples[2], 0);
    }

    #[test]
    fn garbage_is_not_decoded() {
        let mut file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        file.write_all(b"definitely not audio").unwrap();
        file.flush().unwrap();
        assert!(decode_file(file.path()).is_err());
    }

    #[test]
    fn downmix_does_not_overflow() {
        assert_eq!(downmix(&[i32::MAX, i32::MAX]), i32::MAX);
        assert_eq!(downmix(&[i32::MIN, i32::MAX]), 0);
        assert_eq!(downmix(&[7]), 7);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_file("/nonexistent/capture.wav").is_err());
    }

    #[test]
    fn looping_wraps_across_the_end() {
        let mut source = FileSource::from_samples(vec![1, 2, 3], 8000, true);
        let mut frame = Frame::new(2);
        source.acquire(&mut frame).unwrap();
        assert_eq!(frame.samples(), &[1, 2]);
        source.acquire(&mut frame).unwrap();
        assert_eq!(frame.samples(), &[3, 1]);
        source.acquire(&mut frame).unwrap();
        assert_eq!(frame.samples(), &[2, 3]);
    }

    #[test]
    fn empty_source_is_exhausted_even_when_looping() {
        let mut source = FileSource::from_samples(Vec::new(), 8000, true);
        let mut frame = Frame::new(4);
        assert!(matches!(
            source.acquire(&mut frame),
            Err(CaptureError::Exhausted)
        ));
    }
}
