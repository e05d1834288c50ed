//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `scorestats.csv`: `iteration,executed,average,best,worst`
//! - `modestats.csv`: `iteration,mode,share`, one row per mode with trips
//! - `agent_scores.csv`: `agent_id,plan_count,selected_index,selected_score,best_score`,
//!   empty cells for missing scores

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentScoreRow, ModeStatsRow, OutputResult, ScoreStatsRow};

/// Writes run output to three CSV files.
pub struct CsvWriter {
    scores:   Writer<File>,
    modes:    Writer<File>,
    agents:   Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the three CSV files and write the header
    /// rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut scores = Writer::from_path(dir.join("scorestats.csv"))?;
        scores.write_record(["iteration", "executed", "average", "best", "worst"])?;

        let mut modes = Writer::from_path(dir.join("modestats.csv"))?;
        modes.write_record(["iteration", "mode", "share"])?;

        let mut agents = Writer::from_path(dir.join("agent_scores.csv"))?;
        agents.write_record(["agent_id", "plan_count", "selected_index", "selected_score", "best_score"])?;

        Ok(Self {
            scores,
            modes,
            agents,
            finished: false,
        })
    }
}

fn opt(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

impl OutputWriter for CsvWriter {
    fn write_score_stats(&mut self, row: &ScoreStatsRow) -> OutputResult<()> {
        self.scores.write_record(&[
            row.iteration.to_string(),
            row.executed.to_string(),
            row.average.to_string(),
            row.best.to_string(),
            row.worst.to_string(),
        ])?;
        Ok(())
    }

    fn write_mode_stats(&mut self, rows: &[ModeStatsRow]) -> OutputResult<()> {
        for row in rows {
            self.modes.write_record(&[
                row.iteration.to_string(),
                row.mode.as_str().to_string(),
                row.share.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_agent_scores(&mut self, rows: &[AgentScoreRow]) -> OutputResult<()> {
        for row in rows {
            self.agents.write_record(&[
                row.agent_id.0.to_string(),
                row.plan_count.to_string(),
                row.selected_index.to_string(),
                opt(row.selected_score),
                opt(row.best_score),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.scores.flush()?;
        self.modes.flush()?;
        self.agents.flush()?;
        Ok(())
    }
}
