//! Per-agent, per-iteration strategy assignment.
//!
//! ```text
//! innovation_enabled(k)  ⇔  k ≤ last_iteration × (1 − fraction)
//! ```
//!
//! Once false, it stays false for every later iteration.  The strategy of an
//! agent is a weighted draw over the table, restricted to selectors once
//! innovation is off.

use log::debug;

use abm_core::{AgentId, AgentRng, RngStream, StrategyId};

use crate::{PlanSelector, ReplanningError, ReplanningResult, Strategy, StrategySettings};

/// What one agent does in one iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Assignment {
    /// Create a new plan with the innovative strategy `id`.
    Innovate { id: StrategyId, strategy: Strategy },
    /// Choose among existing plans with `selector`.
    Exploit { id: StrategyId, selector: PlanSelector },
}

impl Assignment {
    pub fn id(&self) -> StrategyId {
        match *self {
            Assignment::Innovate { id, .. } | Assignment::Exploit { id, .. } => id,
        }
    }

    pub fn is_innovative(&self) -> bool {
        matches!(self, Assignment::Innovate { .. })
    }
}

#[derive(Clone, Debug)]
pub struct ReplanningScheduler {
    settings: StrategySettings,
    last_iteration: u32,
    seed: u64,
}

impl ReplanningScheduler {
    pub fn new(settings: StrategySettings, last_iteration: u32, seed: u64) -> ReplanningResult<Self> {
        settings.validate()?;
        debug!(
            "replanning: innovation disabled after iteration {:.1}",
            last_iteration as f64 * (1.0 - settings.fraction_of_iterations_to_disable_innovation)
        );
        Ok(Self { settings, last_iteration, seed })
    }

    pub fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    #[inline]
    pub fn innovation_enabled(&self, iteration: u32) -> bool {
        let threshold =
            self.last_iteration as f64 * (1.0 - self.settings.fraction_of_iterations_to_disable_innovation);
        iteration as f64 <= threshold
    }

    /// Draw the strategy of `agent` for `iteration`.
    pub fn assign(&self, iteration: u32, agent: AgentId) -> ReplanningResult<Assignment> {
        let innovation = self.innovation_enabled(iteration);
        let candidates = || {
            self.settings
                .strategies
                .iter()
                .enumerate()
                .filter(move |(_, w)| w.weight > 0.0 && (innovation || !w.strategy.is_innovative()))
        };

        let total: f64 = candidates().map(|(_, w)| w.weight).sum();
        if total <= 0.0 {
            return Err(ReplanningError::NoStrategy { iteration });
        }

        let mut rng = AgentRng::keyed(self.seed, agent, RngStream::Replanning { iteration });
        let mut draw = rng.random::<f64>() * total;
        let mut chosen = None;
        for (i, w) in candidates() {
            chosen = Some((i, w.strategy));
            if draw < w.weight {
                break;
            }
            draw -= w.weight;
        }
        let (index, strategy) = chosen.ok_or(ReplanningError::NoStrategy { iteration })?;
        let id = StrategyId(index as u16);

        Ok(match strategy.selector(self.settings.brain_exp_beta) {
            Some(selector) => Assignment::Exploit { id, selector },
            None => Assignment::Innovate { id, strategy },
        })
    }
}
