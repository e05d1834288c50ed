use abm_core::{AgentId, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopulationError {
    /// A structural invariant of a plan is violated (e.g. a trip without a
    /// leg).  Always an upstream construction bug, never retried.
    #[error("malformed plan: {0}")]
    MalformedPlan(String),

    #[error("agent {0} appears twice in the population")]
    DuplicateAgent(AgentId),

    #[error("agent {agent} has no plan at index {index}")]
    NoSuchPlan { agent: AgentId, index: usize },

    #[error("agent {0}: the selected plan cannot be removed")]
    RemoveSelected(AgentId),

    #[error("population parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PopulationResult<T> = Result<T, PopulationError>;
