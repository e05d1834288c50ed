use thiserror::Error;

use abm_core::{AgentId, StrategyId};
use abm_mobility::MobilityError;
use abm_population::PopulationError;

#[derive(Debug, Error)]
pub enum ReplanningError {
    #[error("replanning configuration error: {0}")]
    Config(String),

    #[error("iteration {iteration}: no strategy with positive weight is available")]
    NoStrategy { iteration: u32 },

    #[error("{strategy} has no strategy module")]
    MissingModule { strategy: StrategyId },

    #[error("{agent}: {reason}")]
    Innovation { agent: AgentId, reason: String },

    #[error("routing failed: {0}")]
    Mobility(#[from] MobilityError),

    #[error(transparent)]
    Population(#[from] PopulationError),
}

pub type ReplanningResult<T> = Result<T, ReplanningError>;
