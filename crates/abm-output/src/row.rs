//! Plain data row types written by output backends.

use abm_core::{AgentId, TransportMode};
use abm_population::Person;
use abm_sim::{IterationRecord, ModeShares};

/// The four score series of one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStatsRow {
    pub iteration: u32,
    pub executed:  f64,
    pub average:   f64,
    pub best:      f64,
    pub worst:     f64,
}

impl From<&IterationRecord> for ScoreStatsRow {
    fn from(r: &IterationRecord) -> Self {
        Self {
            iteration: r.iteration,
            executed:  r.executed,
            average:   r.average,
            best:      r.best,
            worst:     r.worst,
        }
    }
}

/// Share of one main mode in one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeStatsRow {
    pub iteration: u32,
    pub mode:      TransportMode,
    pub share:     f64,
}

impl ModeStatsRow {
    /// One row per mode, in mode order.
    pub fn from_shares(shares: &ModeShares) -> Vec<Self> {
        shares
            .shares
            .iter()
            .map(|(&mode, &share)| Self { iteration: shares.iteration, mode, share })
            .collect()
    }
}

/// Final plan-set summary of one person.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentScoreRow {
    pub agent_id:       AgentId,
    pub plan_count:     usize,
    pub selected_index: usize,
    /// `None` if the selected plan was never executed.
    pub selected_score: Option<f64>,
    pub best_score:     Option<f64>,
}

impl From<&Person> for AgentScoreRow {
    fn from(p: &Person) -> Self {
        Self {
            agent_id:       p.id(),
            plan_count:     p.plan_count(),
            selected_index: p.selected_index(),
            selected_score: p.selected_score(),
            best_score:     p.best_score(),
        }
    }
}
