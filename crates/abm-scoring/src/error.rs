use thiserror::Error;

use abm_core::{AgentId, TransportMode};
use abm_population::PopulationError;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// An event names an activity type or mode without scoring parameters.
    #[error("{agent}: no scoring parameters for {what}")]
    Configuration { agent: AgentId, what: String },

    #[error("{agent}: event at {time} s is earlier than the previous event")]
    Unordered { agent: AgentId, time: f64 },

    /// An `Arrival` without an open `Departure` of the same mode.
    #[error("{agent}: {mode} arrival at {time} s has no matching departure")]
    UnmatchedArrival { agent: AgentId, mode: TransportMode, time: f64 },

    #[error("invalid scoring parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Population(#[from] PopulationError),
}

pub type ScoringResult<T> = Result<T, ScoringError>;

impl ScoringError {
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            ScoringError::Configuration { agent, .. }
            | ScoringError::Unordered { agent, .. }
            | ScoringError::UnmatchedArrival { agent, .. } => Some(*agent),
            _ => None,
        }
    }
}
