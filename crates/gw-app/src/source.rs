use std::path::Path;

use anyhow::Context;
use gw_audio::capture::MicSource;
use gw_audio::decode::FileSource;
use gw_audio::tone::ToneSource;
use gw_core::config::DetectorConfig;
use gw_core::traits::SampleSource;

use crate::cli::Cli;

/// Start the sample source selected on the command line.
///
/// `--tone` wins over `--input`. `--input` is `"mic"`/`"default"` for the
/// default microphone, or a path to an audio file.
///
/// # Errors
/// Returns an error if the device or file is unavailable.
pub fn open_source(cli: &Cli, config: &DetectorConfig) -> anyhow::Result<Box<dyn SampleSource>> {
    if let Some(hz) = cli.tone {
        log::info!("Source synthétique : {hz} Hz @ {} Hz", config.sample_rate);
        return Ok(Box::new(ToneSource::new(
            hz,
            cli.tone_amplitude,
            config.sample_rate,
        )));
    }

    match cli.input.as_str() {
        "default" | "mic" | "microphone" => {
            log::info!("Starting microphone capture");
            let mic = MicSource::start_default().context("Capture micro indisponible")?;
            Ok(Box::new(mic))
        }
        path => {
            let audio_path = Path::new(path);
            if !audio_path.exists() {
                anyhow::bail!("Audio source not found: {path}");
            }
            log::info!("Starting audio file analysis: {path}");
            let file = FileSource::open(audio_path, cli.looping)?;
            if file.len() < config.frame_size {
                log::warn!(
                    "Fichier plus court qu'une frame ({} < {})",
                    file.len(),
                    config.frame_size
                );
            }
            Ok(Box::new(file))
        }
    }
}

/// Align the configured rate on what the source actually delivers.
///
/// Bin frequencies are only meaningful at the real rate, so the source wins.
pub fn reconcile_sample_rate(config: &mut DetectorConfig, source_rate: u32) {
    if source_rate == 0 || source_rate == config.sample_rate {
        return;
    }
    log::warn!(
        "Source @ {source_rate} Hz, configuration @ {} Hz : fréquence de la source retenue",
        config.sample_rate
    );
    config.sample_rate = source_rate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn tone_overrides_input() {
        let cli = Cli::try_parse_from(["glasswatch", "--input", "/nope.wav", "--tone", "3000"])
            .unwrap();
        let config = DetectorConfig::default();
        let source = open_source(&cli, &config).unwrap();
        assert_eq!(source.sample_rate(), config.sample_rate);
    }

    #[test]
    fn missing_file_is_reported() {
        let cli = Cli::try_parse_from(["glasswatch", "--input", "/nonexistent/a.wav"]).unwrap();
        let err = open_source(&cli, &DetectorConfig::default()).err().unwrap();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn source_rate_wins() {
        let mut config = DetectorConfig::default();
        reconcile_sample_rate(&mut config, 48000);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.sub_windows(), 46);

        reconcile_sample_rate(&mut config, 0);
        assert_eq!(config.sample_rate, 48000);
    }
}
