use thiserror::Error;

use abm_core::AgentId;
use abm_mobility::MobilityError;
use abm_population::PopulationError;
use abm_replanning::ReplanningError;
use abm_scoring::ScoringError;

/// A fatal run error.  Every variant raised inside the loop carries the
/// iteration it happened in and, where one is to blame, the agent.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("run configuration error: {0}")]
    Config(String),

    #[error("iteration {iteration}{}: malformed plan: {reason}", agent_suffix(.agent))]
    MalformedPlan {
        iteration: u32,
        agent:     Option<AgentId>,
        reason:    String,
    },

    #[error("iteration {iteration}, {agent}: no scoring parameters for {what}")]
    ScoringConfiguration {
        iteration: u32,
        agent:     AgentId,
        what:      String,
    },

    #[error("iteration {iteration}: scoring failed: {source}")]
    Scoring {
        iteration: u32,
        #[source]
        source:    ScoringError,
    },

    #[error("iteration {iteration}{}: plan execution failed: {source}", agent_suffix(.agent))]
    SimulationExecution {
        iteration: u32,
        agent:     Option<AgentId>,
        #[source]
        source:    MobilityError,
    },

    #[error("iteration {iteration}, {agent}: replanning failed: {source}")]
    Replanning {
        iteration: u32,
        agent:     AgentId,
        #[source]
        source:    ReplanningError,
    },

    #[error("iteration {iteration}: statistics out of order: {reason}")]
    Statistics { iteration: u32, reason: String },

    #[error(transparent)]
    Population(#[from] PopulationError),
}

pub type RunResult<T> = Result<T, RunError>;

impl RunError {
    /// Iteration the error was raised in; `None` for errors before the loop.
    pub fn iteration(&self) -> Option<u32> {
        match self {
            RunError::MalformedPlan { iteration, .. }
            | RunError::ScoringConfiguration { iteration, .. }
            | RunError::Scoring { iteration, .. }
            | RunError::SimulationExecution { iteration, .. }
            | RunError::Replanning { iteration, .. }
            | RunError::Statistics { iteration, .. } => Some(*iteration),
            RunError::Config(_) | RunError::Population(_) => None,
        }
    }

    pub fn agent(&self) -> Option<AgentId> {
        match self {
            RunError::MalformedPlan { agent, .. } | RunError::SimulationExecution { agent, .. } => *agent,
            RunError::ScoringConfiguration { agent, .. } | RunError::Replanning { agent, .. } => Some(*agent),
            RunError::Scoring { source, .. } => source.agent(),
            _ => None,
        }
    }

    // ── Conversions from the phase errors ─────────────────────────────────

    pub(crate) fn from_population(iteration: u32, agent: Option<AgentId>, err: PopulationError) -> Self {
        match err {
            PopulationError::MalformedPlan(reason) => RunError::MalformedPlan { iteration, agent, reason },
            other => RunError::MalformedPlan { iteration, agent, reason: other.to_string() },
        }
    }

    pub(crate) fn from_mobility(iteration: u32, err: MobilityError) -> Self {
        match err {
            MobilityError::Population(PopulationError::MalformedPlan(reason)) => {
                RunError::MalformedPlan { iteration, agent: None, reason }
            }
            other => RunError::SimulationExecution { iteration, agent: other.agent(), source: other },
        }
    }

    pub(crate) fn from_scoring(iteration: u32, err: ScoringError) -> Self {
        match err {
            ScoringError::Configuration { agent, what } => {
                RunError::ScoringConfiguration { iteration, agent, what }
            }
            ScoringError::Population(PopulationError::MalformedPlan(reason)) => {
                RunError::MalformedPlan { iteration, agent: None, reason }
            }
            other => RunError::Scoring { iteration, source: other },
        }
    }

    pub(crate) fn from_replanning(iteration: u32, agent: AgentId, err: ReplanningError) -> Self {
        match err {
            ReplanningError::Population(PopulationError::MalformedPlan(reason))
            | ReplanningError::Mobility(MobilityError::Population(PopulationError::MalformedPlan(reason))) => {
                RunError::MalformedPlan { iteration, agent: Some(agent), reason }
            }
            other => RunError::Replanning { iteration, agent, source: other },
        }
    }
}

fn agent_suffix(agent: &Option<AgentId>) -> String {
    agent.map(|a| format!(", {a}")).unwrap_or_default()
}
