use std::io::Write;

use gw_core::label::ClassLabel;
use gw_core::report::EpochReport;
use gw_core::traits::Reporter;

/// Rapport texte, une ligne de décision par époque (+ timings optionnels).
///
/// Les erreurs d'écriture sont journalisées puis ignorées : un terminal
/// fermé n'arrête pas la détection.
pub struct ConsoleReporter<W: Write> {
    out: W,
    timings: bool,
}

impl<W: Write> ConsoleReporter<W> {
    /// Report into `out`, with per-stage timings when `timings` is set.
    pub fn new(out: W, timings: bool) -> Self {
        Self { out, timings }
    }

    fn write_report(&mut self, report: &EpochReport) -> std::io::Result<()> {
        match report.label() {
            ClassLabel::NoActivity => writeln!(self.out, "No intrusion detected")?,
            label => writeln!(self.out, "Intrusion detected: {label}")?,
        }
        if !self.timings {
            return Ok(());
        }

        if let Some(hz) = report.dominant_hz {
            writeln!(self.out, "  dominant frequency: {hz} Hz")?;
        }
        for stage in &report.stages {
            writeln!(
                self.out,
                "  {:?}: {} ticks ({:.6} s)",
                stage.stage, stage.ticks, stage.seconds
            )?;
        }
        writeln!(
            self.out,
            "  active: {} ticks ({:.6} s), previous idle {:.3} s",
            report.active_ticks, report.active_secs, report.previous_idle_secs
        )?;
        Ok(())
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, report: &EpochReport) {
        if let Err(e) = self.write_report(report).and_then(|()| self.out.flush()) {
            log::warn!("Écriture du rapport impossible : {e}");
        }
    }
}

/// Rapport JSON, un objet par ligne.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    /// Report into `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, report: &EpochReport) {
        let written = serde_json::to_writer(&mut self.out, report)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(self.out))
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            log::warn!("Écriture du rapport JSON impossible : {e}");
        }
    }
}
