//! The `OutputWriter` trait implemented by backend writers.

use crate::{AgentScoreRow, ModeStatsRow, OutputResult, ScoreStatsRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the listener's perspective; errors are
/// stored internally and retrieved with
/// [`ControlerOutputListener::take_error`][crate::ControlerOutputListener::take_error].
pub trait OutputWriter {
    /// Write one score statistics row.
    fn write_score_stats(&mut self, row: &ScoreStatsRow) -> OutputResult<()>;

    /// Write the mode shares of one iteration.
    fn write_mode_stats(&mut self, rows: &[ModeStatsRow]) -> OutputResult<()>;

    /// Write the final per-agent scores.
    fn write_agent_scores(&mut self, rows: &[AgentScoreRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent - safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
