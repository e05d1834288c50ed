//! `ControlerOutputListener<W>` - bridges `ControlerListener` to an
//! `OutputWriter`.

use abm_population::Population;
use abm_sim::{ControlerListener, IterationSummary};

use crate::row::{AgentScoreRow, ModeStatsRow, ScoreStatsRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`ControlerListener`] that writes score statistics and mode shares after
/// every iteration and the final agent scores at shutdown.
///
/// Errors from the writer are stored internally because listener methods
/// have no return value.  After `controler.run()` returns, check for errors
/// with [`take_error`][Self::take_error].
pub struct ControlerOutputListener<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ControlerOutputListener<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `controler.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            log::warn!("output: {e}");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> ControlerListener for ControlerOutputListener<W> {
    fn on_iteration_end(&mut self, summary: &IterationSummary<'_>) {
        let result = self.writer.write_score_stats(&ScoreStatsRow::from(summary.scores));
        self.store_err(result);

        let rows = ModeStatsRow::from_shares(summary.modes);
        let result = self.writer.write_mode_stats(&rows);
        self.store_err(result);
    }

    fn on_shutdown(&mut self, _last_iteration: u32, population: &Population) {
        let rows: Vec<AgentScoreRow> = population.persons().iter().map(AgentScoreRow::from).collect();
        let result = self.writer.write_agent_scores(&rows);
        self.store_err(result);

        let result = self.writer.finish();
        self.store_err(result);
    }
}
