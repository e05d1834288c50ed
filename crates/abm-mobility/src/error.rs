//! Mobility-subsystem error type.

use thiserror::Error;

use abm_core::{AgentId, TransportMode};
use abm_population::PopulationError;

/// Errors produced by `abm-mobility`.
#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("no routing parameters for mode {0}")]
    UnknownMode(TransportMode),

    #[error("invalid routing parameters for mode {mode}: {reason}")]
    InvalidParams { mode: TransportMode, reason: String },

    #[error("invalid beeline distance {0}")]
    InvalidDistance(f64),

    #[error("{agent}: leg {leg_index} ({mode}) has no route")]
    Unrouted { agent: AgentId, leg_index: u32, mode: TransportMode },

    #[error("{agent}: {reason}")]
    Execution { agent: AgentId, reason: String },

    #[error(transparent)]
    Population(#[from] PopulationError),
}

pub type MobilityResult<T> = Result<T, MobilityError>;

impl MobilityError {
    /// The agent the error is attributed to, if any.
    pub fn agent(&self) -> Option<AgentId> {
        match self {
            MobilityError::Unrouted { agent, .. } | MobilityError::Execution { agent, .. } => {
                Some(*agent)
            }
            _ => None,
        }
    }
}
