use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use gw_audio::scheduler::EpochScheduler;
use gw_core::config::{DetectorConfig, WindowKind};
use gw_core::error::CaptureError;
use gw_core::traits::Reporter;

pub mod cli;
pub mod platform;
pub mod report;
pub mod source;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    cli.validate()?;

    // 3. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli.config)?;
    apply_overrides(&cli, &mut config);
    config.validate()?;

    // 4. Démarrer la source
    let source = source::open_source(&cli, &config)?;
    source::reconcile_sample_rate(&mut config, source.sample_rate());
    config.log_summary();

    // 5. Rapporteur
    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(report::JsonReporter::new(std::io::stdout()))
    } else {
        Box::new(report::ConsoleReporter::new(std::io::stdout(), cli.timings))
    };

    // 6. Boucle principale
    let mut scheduler = EpochScheduler::new(
        &config,
        source,
        platform::SleepIdle,
        reporter,
        platform::MonotonicCounter::new(),
    )?;

    match scheduler.run(cli.epochs) {
        Ok(done) => {
            log::info!("{done} époque(s) terminée(s)");
            Ok(())
        }
        Err(CaptureError::Exhausted) => {
            log::info!("Fin de la source après {} époque(s)", scheduler.epoch());
            Ok(())
        }
        Err(e) => Err(e).context("Acquisition interrompue"),
    }
}

/// Load `path`, or fall back to the defaults if it does not exist.
fn resolve_config(path: &Path) -> Result<DetectorConfig> {
    if path.exists() {
        gw_core::config::load_config(path)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            path.display()
        );
        Ok(DetectorConfig::default())
    }
}

fn apply_overrides(cli: &cli::Cli, config: &mut DetectorConfig) {
    if let Some(n) = cli.frame_size {
        config.frame_size = n;
    }
    if let Some(t) = cli.threshold {
        config.activity_threshold = t;
    }
    if let Some(secs) = cli.interval {
        config.epoch_interval_secs = secs;
    }
    if let Some(ref window) = cli.window {
        config.window = match window.as_str() {
            "rectangular" | "rect" | "none" => WindowKind::Rectangular,
            "hann" | "hanning" => WindowKind::Hann,
            _ => {
                log::warn!("Fenêtre inconnue '{window}', utilisation du défaut.");
                config.window
            }
        };
    }
}
