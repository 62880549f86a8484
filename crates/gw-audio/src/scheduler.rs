use std::time::Duration;

use gw_core::config::DetectorConfig;
use gw_core::error::{CaptureError, CoreError};
use gw_core::frame::Frame;
use gw_core::report::EpochReport;
use gw_core::timing::{Stage, TimingAccumulator, ticks_to_secs};
use gw_core::traits::{CycleCounter, IdleWait, Reporter, SampleSource};

use crate::classify::Peak;
use crate::pipeline::FramePipeline;
use crate::vote::VotingAggregator;

/// Boucle principale : N sous-fenêtres → vote → rapport → veille.
///
/// Mono-thread et coopératif : une seule frame en vol, l'acquisition bloque,
/// la veille entre deux époques est le seul point de suspension. Toute
/// erreur d'acquisition interrompt l'époque en cours sans rapport ni retry.
pub struct EpochScheduler<S, W, R, C> {
    source: S,
    idle: W,
    reporter: R,
    counter: C,
    pipeline: FramePipeline,
    voter: VotingAggregator,
    frame: Frame,
    timing: TimingAccumulator,
    interval: Duration,
    epoch: u64,
    previous_idle_secs: f64,
}

impl<S, W, R, C> EpochScheduler<S, W, R, C>
where
    S: SampleSource,
    W: IdleWait,
    R: Reporter,
    C: CycleCounter,
{
    /// Build the scheduler and every buffer it reuses.
    ///
    /// # Errors
    /// Returns an error if the spectral transform cannot be planned.
    pub fn new(
        config: &DetectorConfig,
        source: S,
        idle: W,
        reporter: R,
        counter: C,
    ) -> Result<Self, CoreError> {
        if source.sample_rate() != config.sample_rate {
            log::warn!(
                "Source @ {} Hz, configuration @ {} Hz : bandes décalées",
                source.sample_rate(),
                config.sample_rate
            );
        }
        Ok(Self {
            source,
            idle,
            reporter,
            counter,
            pipeline: FramePipeline::new(config)?,
            voter: VotingAggregator::from_config(config),
            frame: Frame::new(config.frame_size),
            timing: TimingAccumulator::default(),
            interval: config.epoch_interval(),
            epoch: 0,
            previous_idle_secs: 0.0,
        })
    }

    /// Run one epoch and publish its report. Does not idle afterwards.
    ///
    /// # Errors
    /// Returns the first acquisition failure; the partial epoch is discarded.
    pub fn run_epoch(&mut self) -> Result<EpochReport, CaptureError> {
        let epoch_start = self.counter.now();
        let mut strongest: Option<Peak> = None;

        // Audio captured during the idle wait is stale
        self.source.discard_buffered();
        self.timing
            .record_since(Stage::Acquisition, &self.counter, epoch_start);

        for _ in 0..self.voter.sub_windows() {
            let start = self.counter.now();
            if let Err(e) = self.source.acquire(&mut self.frame) {
                self.discard_epoch();
                return Err(e);
            }
            self.timing.record_since(Stage::Acquisition, &self.counter, start);

            let result = self
                .pipeline
                .process(&self.frame, &mut self.timing, &self.counter);
            if let Some(peak) = result.peak
                && strongest.is_none_or(|s| peak.magnitude > s.magnitude)
            {
                strongest = Some(peak);
            }

            let start = self.counter.now();
            self.voter.increment(result.label);
            self.timing.record_since(Stage::Voting, &self.counter, start);
        }

        let start = self.counter.now();
        let decision = self.voter.decide();
        self.timing.record_since(Stage::Voting, &self.counter, start);

        let active_ticks = self.counter.now().wrapping_sub(epoch_start);
        let hz = self.counter.frequency_hz();

        let report = EpochReport {
            epoch: self.epoch,
            decision,
            dominant_hz: strongest.map(|p| p.hz),
            sub_windows: self.voter.sub_windows(),
            stages: self.timing.snapshot(hz),
            active_ticks,
            active_secs: ticks_to_secs(active_ticks, hz),
            previous_idle_secs: self.previous_idle_secs,
        };

        log::debug!(
            "Epoch {} : {} ({:?}), active {} ticks",
            report.epoch,
            report.label(),
            report.decision.kind,
            active_ticks
        );
        self.reporter.report(&report);

        self.timing.reset();
        self.epoch += 1;
        Ok(report)
    }

    /// Run epochs back to back, idling `epoch_interval` between them.
    ///
    /// Runs forever when `max_epochs` is `None`; otherwise stops after that
    /// many epochs without idling after the last one. Returns the number of
    /// completed epochs.
    ///
    /// # Errors
    /// Returns the first acquisition failure.
    pub fn run(&mut self, max_epochs: Option<u64>) -> Result<u64, CaptureError> {
        let mut completed = 0u64;
        while max_epochs.is_none_or(|max| completed < max) {
            self.run_epoch()?;
            completed += 1;

            if max_epochs.is_some_and(|max| completed >= max) {
                break;
            }

            let start = self.counter.now();
            self.idle.wait(self.interval);
            let idle_ticks = self.counter.now().wrapping_sub(start);
            self.previous_idle_secs = ticks_to_secs(idle_ticks, self.counter.frequency_hz());
            log::debug!(
                "Idle {idle_ticks} ticks ({:.3} s)",
                self.previous_idle_secs
            );
        }
        Ok(completed)
    }

    fn discard_epoch(&mut self) {
        if self.voter.observed() > 0 {
            log::warn!(
                "Époque {} abandonnée après {} sous-fenêtres",
                self.epoch,
                self.voter.observed()
            );
        }
        self.voter.reset();
        self.timing.reset();
    }

    /// Number of the next epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The reporter, e.g. to inspect collected reports.
    #[must_use]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// The idle collaborator.
    #[must_use]
    pub fn idle(&self) -> &W {
        &self.idle
    }
}
