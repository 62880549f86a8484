/// Configuration, types, and shared structures for glasswatch.
///
/// This crate contains the data model (frames, spectra, labels, tallies,
/// timings), the platform traits the detection core consumes, and the
/// configuration logic used across the glasswatch workspace.

pub mod band;
pub mod config;
pub mod error;
pub mod frame;
pub mod label;
pub mod report;
pub mod tally;
pub mod timing;
pub mod traits;

pub use config::DetectorConfig;
pub use error::{CaptureError, CoreError};
pub use frame::{Frame, NormalizedFrame, Spectrum};
pub use label::ClassLabel;
pub use report::EpochReport;
pub use tally::{Decision, DecisionKind, EpochTally};
