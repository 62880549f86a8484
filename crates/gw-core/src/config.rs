use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::band::{BandTable, FrequencyBand};
use crate::error::CoreError;
use crate::label::ClassLabel;

/// Configuration complète du détecteur.
///
/// Figée au démarrage : toutes les tailles de buffers en dérivent. Chaque
/// champ a une valeur par défaut reprenant le design de référence
/// (1024 échantillons à 16447 Hz, seuil RMS 0.03, vote toutes les 2 s).
///
/// # Example
/// ```
/// use gw_core::config::DetectorConfig;
/// let config = DetectorConfig::default();
/// assert_eq!(config.frame_size, 1024);
/// assert_eq!(config.sub_windows(), 16);
/// assert_eq!(config.cutoff_bins(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectorConfig {
    // === Acquisition ===
    /// Samples per frame. Even, >= 2.
    pub frame_size: usize,
    /// Effective sample rate of the source, in Hz.
    pub sample_rate: u32,
    /// Largest raw sample magnitude; the normalizer scales by its reciprocal.
    pub max_raw_magnitude: u32,

    // === Spectre ===
    /// Bins below this frequency (and bin 0) are zeroed.
    pub low_freq_cutoff_hz: u32,
    /// Analysis window applied before the transform.
    pub window: WindowKind,

    // === Classification ===
    /// Spectral RMS below this value means "no activity".
    pub activity_threshold: f32,
    /// Ordered band table, first match wins.
    pub bands: BandTable,

    // === Vote ===
    /// Explicit sub-window count per epoch. `None` = `sample_rate / frame_size`.
    pub sub_windows_per_epoch: Option<usize>,
    /// Integer divisor applied to the NoActivity tally before voting.
    pub noise_weight_divisor: u32,
    /// Idle time between two epochs, in seconds.
    pub epoch_interval_secs: f32,

    // === Plateforme ===
    /// Clock tree the sample rate was derived from, when configured that way.
    pub clock: Option<ClockTree>,
}

/// Analysis window applied to the normalized frame before the FFT.
///
/// # Example
/// ```
/// use gw_core::config::WindowKind;
/// assert_eq!(WindowKind::default(), WindowKind::Rectangular);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum WindowKind {
    /// No windowing (reference behaviour).
    #[default]
    Rectangular,
    /// Hann window, less leakage at the cost of a wider main lobe.
    Hann,
}

/// Chaîne d'horloge du convertisseur : la fréquence d'échantillonnage en découle.
///
/// `fs = system_clock_hz / output_divider / (oversampling * integrator_oversampling)`.
///
/// # Example
/// ```
/// use gw_core::config::ClockTree;
/// let clock = ClockTree::default();
/// assert_eq!(clock.derived_sample_rate(), 16447);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ClockTree {
    /// Converter input clock, in Hz.
    pub system_clock_hz: f64,
    /// Output clock divider.
    pub output_divider: u32,
    /// Filter oversampling ratio.
    pub oversampling: u32,
    /// Integrator oversampling ratio.
    pub integrator_oversampling: u32,
}

impl ClockTree {
    /// Exact derived sample rate in Hz, or 0 if a divider is zero.
    #[must_use]
    pub fn derived_sample_rate_hz(&self) -> f64 {
        let divisor = f64::from(self.output_divider)
            * f64::from(self.oversampling)
            * f64::from(self.integrator_oversampling);
        if divisor <= 0.0 {
            return 0.0;
        }
        self.system_clock_hz / divisor
    }

    /// Derived sample rate, floored to whole Hz.
    #[must_use]
    pub fn derived_sample_rate(&self) -> u32 {
        self.derived_sample_rate_hz().max(0.0) as u32
    }
}

impl Default for ClockTree {
    fn default() -> Self {
        Self {
            system_clock_hz: 80e6,
            output_divider: 32,
            oversampling: 38,
            integrator_oversampling: 4,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            sample_rate: 16447,
            max_raw_magnitude: i32::MAX as u32,
            low_freq_cutoff_hz: 20,
            window: WindowKind::Rectangular,
            activity_threshold: 0.03,
            bands: BandTable::default(),
            sub_windows_per_epoch: None,
            noise_weight_divisor: 5,
            epoch_interval_secs: 2.0,
            clock: None,
        }
    }
}

impl DetectorConfig {
    /// Sub-windows per epoch: the explicit override, else `sample_rate / frame_size`,
    /// never less than 1.
    #[must_use]
    pub fn sub_windows(&self) -> usize {
        self.sub_windows_per_epoch
            .unwrap_or_else(|| self.sample_rate as usize / self.frame_size.max(1))
            .max(1)
    }

    /// Idle time between epochs.
    #[must_use]
    pub fn epoch_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.epoch_interval_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Number of leading spectrum bins forced to zero: every bin whose
    /// frequency is below the cutoff, and at least bin 0.
    #[must_use]
    pub fn cutoff_bins(&self) -> usize {
        if self.sample_rate == 0 {
            return 1;
        }
        let numerator = u64::from(self.low_freq_cutoff_hz) * self.frame_size as u64;
        let bins = numerator.div_ceil(u64::from(self.sample_rate)) as usize;
        bins.clamp(1, (self.frame_size / 2).max(1))
    }

    /// Check every invariant the pipeline relies on.
    ///
    /// # Errors
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.frame_size < 2 || self.frame_size % 2 != 0 {
            return Err(CoreError::UnsupportedFrameSize {
                size: self.frame_size,
            });
        }
        if self.sample_rate == 0 {
            return Err(CoreError::Config("sample_rate doit être > 0".into()));
        }
        if self.max_raw_magnitude == 0 {
            return Err(CoreError::Config("max_raw_magnitude doit être > 0".into()));
        }
        if !self.activity_threshold.is_finite() || self.activity_threshold < 0.0 {
            return Err(CoreError::Config(format!(
                "activity_threshold invalide : {}",
                self.activity_threshold
            )));
        }
        if self.epoch_interval_secs < 0.0
            || Duration::try_from_secs_f32(self.epoch_interval_secs).is_err()
        {
            return Err(CoreError::Config(format!(
                "epoch_interval_secs invalide : {}",
                self.epoch_interval_secs
            )));
        }
        if self.noise_weight_divisor == 0 {
            return Err(CoreError::Config(
                "noise_weight_divisor doit être >= 1".into(),
            ));
        }
        if self.sub_windows_per_epoch == Some(0) {
            return Err(CoreError::Config(
                "sub_windows_per_epoch doit être >= 1".into(),
            ));
        }
        if let Some(band) = self.bands.bands.iter().find(|b| b.is_empty()) {
            return Err(CoreError::Config(format!(
                "bande vide : {} [{}, {}]",
                band.name, band.min_hz, band.max_hz
            )));
        }
        Ok(())
    }

    /// Log the effective configuration and any band overlap.
    pub fn log_summary(&self) {
        log::info!(
            "Frame {} @ {} Hz, {} sub-windows/epoch, cutoff {} Hz ({} bins), threshold {}",
            self.frame_size,
            self.sample_rate,
            self.sub_windows(),
            self.low_freq_cutoff_hz,
            self.cutoff_bins(),
            self.activity_threshold
        );
        if let Some(clock) = &self.clock {
            log::info!(
                "Calculated sampling frequency: {:.2} kHz",
                clock.derived_sample_rate_hz() / 1e3
            );
        }
        let nyquist = self.sample_rate / 2;
        for (i, j) in self.bands.overlaps() {
            let (a, b) = (&self.bands.bands[i], &self.bands.bands[j]);
            log::warn!(
                "Bandes chevauchantes : '{}' précède '{}' (first match wins)",
                a.name,
                b.name
            );
        }
        for j in self.bands.shadowed() {
            log::warn!(
                "Bande '{}' entièrement masquée, elle ne sera jamais retenue",
                self.bands.bands[j].name
            );
        }
        for band in self.bands.bands.iter().filter(|b| b.min_hz > nyquist) {
            log::warn!(
                "Bande '{}' au-dessus de Nyquist ({nyquist} Hz)",
                band.name
            );
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    detector: Option<DetectorSection>,
    classifier: Option<ClassifierSection>,
    clock: Option<ClockTree>,
}

/// Detector section, all fields optional for partial override.
#[derive(Deserialize)]
struct DetectorSection {
    frame_size: Option<usize>,
    sample_rate: Option<u32>,
    max_raw_magnitude: Option<u32>,
    low_freq_cutoff_hz: Option<u32>,
    window: Option<WindowKind>,
    activity_threshold: Option<f32>,
    sub_windows_per_epoch: Option<usize>,
    noise_weight_divisor: Option<u32>,
    epoch_interval_secs: Option<f32>,
}

/// Classifier section: replaces the whole band table when `bands` is given.
#[derive(Deserialize)]
struct ClassifierSection {
    fallback: Option<ClassLabel>,
    bands: Option<Vec<FrequencyBand>>,
}

/// Parse TOML text and merge it over the defaults, then validate.
///
/// # Errors
/// Returns an error if the text is not valid TOML or the result is invalid.
///
/// # Example
/// ```
/// use gw_core::config::parse_config;
/// let config = parse_config("[detector]\nframe_size = 2048\n").unwrap();
/// assert_eq!(config.frame_size, 2048);
/// assert_eq!(config.sample_rate, 16447);
/// ```
pub fn parse_config(content: &str) -> Result<DetectorConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = DetectorConfig::default();
    let mut explicit_rate = false;

    if let Some(d) = file.detector {
        if let Some(v) = d.frame_size {
            config.frame_size = v;
        }
        if let Some(v) = d.sample_rate {
            config.sample_rate = v;
            explicit_rate = true;
        }
        if let Some(v) = d.max_raw_magnitude {
            config.max_raw_magnitude = v;
        }
        if let Some(v) = d.low_freq_cutoff_hz {
            config.low_freq_cutoff_hz = v;
        }
        if let Some(v) = d.window {
            config.window = v;
        }
        if let Some(v) = d.activity_threshold {
            config.activity_threshold = v;
        }
        if d.sub_windows_per_epoch.is_some() {
            config.sub_windows_per_epoch = d.sub_windows_per_epoch;
        }
        if let Some(v) = d.noise_weight_divisor {
            config.noise_weight_divisor = v;
        }
        if let Some(v) = d.epoch_interval_secs {
            config.epoch_interval_secs = v;
        }
    }

    if let Some(c) = file.classifier {
        if let Some(v) = c.fallback {
            config.bands.fallback = v;
        }
        if let Some(v) = c.bands {
            config.bands.bands = v;
        }
    }

    if let Some(clock) = file.clock {
        if !explicit_rate {
            config.sample_rate = clock.derived_sample_rate();
        }
        config.clock = Some(clock);
    }

    config.validate()?;
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed, or fails validation.
///
/// # Example
/// ```no_run
/// use gw_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<DetectorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Configuration invalide dans {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.epoch_interval(), Duration::from_secs(2));
    }

    #[test]
    fn cutoff_bins_cover_every_sub_cutoff_frequency() {
        let config = DetectorConfig::default();
        // bin 1 = 16.06 Hz < 20 Hz, bin 2 = 32.1 Hz
        assert_eq!(config.cutoff_bins(), 2);

        let exact = DetectorConfig {
            frame_size: 1000,
            sample_rate: 1000,
            ..DetectorConfig::default()
        };
        // bin 20 is exactly 20 Hz and must survive
        assert_eq!(exact.cutoff_bins(), 20);

        let no_cutoff = DetectorConfig {
            low_freq_cutoff_hz: 0,
            ..DetectorConfig::default()
        };
        assert_eq!(no_cutoff.cutoff_bins(), 1);
    }

    #[test]
    fn sub_windows_never_zero() {
        let config = DetectorConfig {
            frame_size: 32768,
            ..DetectorConfig::default()
        };
        assert_eq!(config.sub_windows(), 1);
        let explicit = DetectorConfig {
            sub_windows_per_epoch: Some(7),
            ..DetectorConfig::default()
        };
        assert_eq!(explicit.sub_windows(), 7);
    }

    #[test]
    fn odd_frame_size_is_rejected() {
        let config = DetectorConfig {
            frame_size: 1023,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::UnsupportedFrameSize { size: 1023 })
        ));
    }

    #[test]
    fn clock_section_derives_sample_rate() {
        let config = parse_config(
            "[clock]\nsystem_clock_hz = 80000000.0\noutput_divider = 32\noversampling = 38\nintegrator_oversampling = 4\n",
        )
        .unwrap();
        assert_eq!(config.sample_rate, 16447);
        assert!(config.clock.is_some());

        let explicit = parse_config(
            "[detector]\nsample_rate = 16000\n[clock]\nsystem_clock_hz = 80000000.0\noutput_divider = 32\noversampling = 38\nintegrator_oversampling = 4\n",
        )
        .unwrap();
        assert_eq!(explicit.sample_rate, 16000);
    }

    #[test]
    fn classifier_section_replaces_bands() {
        let config = parse_config(
            r#"
[classifier]
fallback = "Other"

[[classifier.bands]]
name = "low"
min_hz = 0
max_hz = 1000
label = "Voices"
"#,
        )
        .unwrap();
        assert_eq!(config.bands.bands.len(), 1);
        assert_eq!(config.bands.classify(500), ClassLabel::Voices);
        assert_eq!(config.bands.classify(5000), ClassLabel::Other);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_config("[detector]\nnoise_weight_divisor = 0\n").is_err());
        assert!(parse_config("[detector]\nactivity_threshold = -1.0\n").is_err());
        assert!(parse_config("[detector]\nsub_windows_per_epoch = 0\n").is_err());
        assert!(parse_config("[detector]\nepoch_interval_secs = 1e20\n").is_err());
        assert!(parse_config("[detector]\nepoch_interval_secs = nan\n").is_err());
        assert!(parse_config("[detector\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[detector]\nactivity_threshold = 0.05\nwindow = \"Hann\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert!((config.activity_threshold - 0.05).abs() < f32::EPSILON);
        assert_eq!(config.window, WindowKind::Hann);
    }

    #[test]
    fn oversized_interval_does_not_panic() {
        let config = DetectorConfig {
            epoch_interval_secs: 1e20,
            ..DetectorConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.epoch_interval(), Duration::MAX);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(
            DetectorConfig {
                clock: None,
                ..config
            },
            DetectorConfig::default()
        );
        assert_eq!(config.clock, Some(ClockTree::default()));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/glasswatch.toml")).is_err());
    }
}
