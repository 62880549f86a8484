use std::path::PathBuf;

use clap::Parser;

/// glasswatch — Détecteur d'intrusion acoustique.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source audio : "mic" pour microphone, ou chemin vers fichier audio.
    #[arg(short, long, default_value = "mic")]
    pub input: String,

    /// Remplacer la source par une sinusoïde synthétique à cette fréquence (Hz).
    #[arg(long)]
    pub tone: Option<f64>,

    /// Amplitude de la sinusoïde, fraction de la pleine échelle.
    #[arg(long, default_value_t = 0.5)]
    pub tone_amplitude: f64,

    /// Reboucler le fichier audio au lieu de s'arrêter en fin de fichier.
    #[arg(long = "loop", default_value_t = false)]
    pub looping: bool,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Nombre d'époques avant arrêt (défaut : infini).
    #[arg(long)]
    pub epochs: Option<u64>,

    /// Veille entre deux époques, en secondes.
    #[arg(long)]
    pub interval: Option<f32>,

    /// Taille de frame (paire).
    #[arg(long)]
    pub frame_size: Option<usize>,

    /// Seuil RMS spectral d'activité.
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Fenêtre d'analyse : rectangular, hann.
    #[arg(long)]
    pub window: Option<String>,

    /// Rapports en JSON (une ligne par époque).
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Afficher fréquence dominante et timings par étape.
    #[arg(long, default_value_t = false)]
    pub timings: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Reject argument values no configuration could accept.
    ///
    /// # Errors
    /// Returns an error for a non-positive tone frequency or an amplitude
    /// outside [0, 1].
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(hz) = self.tone
            && !(hz.is_finite() && hz > 0.0)
        {
            anyhow::bail!("Fréquence de --tone invalide : {hz}");
        }
        if !(0.0..=1.0).contains(&self.tone_amplitude) {
            anyhow::bail!(
                "Amplitude hors de [0, 1] : {}",
                self.tone_amplitude
            );
        }
        if self.tone.is_some() && self.looping {
            log::warn!("--loop ignoré avec --tone");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["glasswatch"]).unwrap();
        assert_eq!(cli.input, "mic");
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
        assert!(cli.epochs.is_none());
        assert!(!cli.looping);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn overrides_parse() {
        let cli = Cli::try_parse_from([
            "glasswatch",
            "--input",
            "capture.wav",
            "--loop",
            "--epochs",
            "3",
            "--interval",
            "0",
            "--threshold",
            "0.05",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.input, "capture.wav");
        assert!(cli.looping);
        assert_eq!(cli.epochs, Some(3));
        assert_eq!(cli.interval, Some(0.0));
        assert_eq!(cli.threshold, Some(0.05));
        assert!(cli.json);
    }

    #[test]
    fn invalid_tone_is_rejected() {
        let cli = Cli::try_parse_from(["glasswatch", "--tone", "0"]).unwrap();
        assert!(cli.validate().is_err());
        let cli = Cli::try_parse_from(["glasswatch", "--tone", "440", "--tone-amplitude", "1.5"])
            .unwrap();
        assert!(cli.validate().is_err());
    }
}
