use thiserror::Error;

/// Errors originating from the core module.
///
/// All of them are startup-time failures: once a pipeline is built, nothing
/// downstream of acquisition can fail.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// The spectral engine cannot be planned for this frame size.
    #[error("Taille de frame non supportée : {size} (paire et >= 2 requise)")]
    UnsupportedFrameSize {
        /// Rejected frame size.
        size: usize,
    },
}

/// Errors raised by a [`SampleSource`](crate::traits::SampleSource).
///
/// Capture failures are fatal: the scheduler never retries them.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// No audio input device found.
    #[error("Aucun périphérique audio d'entrée trouvé")]
    NoInputDevice,

    /// The capture stream reported an error.
    #[error("Erreur de stream audio : {0}")]
    Stream(String),

    /// The producer side went away while a frame was being filled.
    #[error("Source audio déconnectée")]
    Disconnected,

    /// A finite source has no more samples.
    #[error("Source audio épuisée")]
    Exhausted,

    /// Audio decode error.
    #[error("Erreur de décodage : {0}")]
    Decode(String),
}
