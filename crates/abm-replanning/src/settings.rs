//! Strategy table and replanning settings.

use abm_core::TransportMode;

use crate::{PlanSelector, ReplanningError, ReplanningResult};

/// The built-in replanning strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    // Selectors: choose among existing plans.
    ChangeExpBeta,
    BestScore,
    KeepLastSelected,
    SelectRandom,
    // Innovation: derive a new plan from the selected one.
    ReRoute,
    ChangeSingleTripMode,
    TimeAllocationMutator,
}

impl Strategy {
    /// `true` for strategies that create a new plan.
    pub fn is_innovative(self) -> bool {
        matches!(
            self,
            Strategy::ReRoute | Strategy::ChangeSingleTripMode | Strategy::TimeAllocationMutator
        )
    }

    /// The selector behind a non-innovative strategy.
    pub fn selector(self, brain_exp_beta: f64) -> Option<PlanSelector> {
        match self {
            Strategy::ChangeExpBeta => Some(PlanSelector::ChangeExpBeta { beta: brain_exp_beta }),
            Strategy::BestScore => Some(PlanSelector::BestScore),
            Strategy::KeepLastSelected => Some(PlanSelector::KeepLastSelected),
            Strategy::SelectRandom => Some(PlanSelector::SelectRandom),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyWeight {
    pub strategy: Strategy,
    pub weight: f64,
}

impl StrategyWeight {
    pub fn new(strategy: Strategy, weight: f64) -> Self {
        Self { strategy, weight }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StrategySettings {
    /// Weighted strategy table; the position of an entry is its `StrategyId`.
    pub strategies: Vec<StrategyWeight>,
    /// Innovation stops after `last_iteration × (1 − fraction)`.
    pub fraction_of_iterations_to_disable_innovation: f64,
    /// Maximum plans per person; 0 means unbounded.
    pub max_agent_plan_memory_size: usize,
    /// β of the ChangeExpBeta selector.
    pub brain_exp_beta: f64,
    /// Half-width (s) of the uniform end-time shift of `TimeAllocationMutator`.
    pub mutation_range: f64,
    /// Candidate main modes of `ChangeSingleTripMode`.
    pub change_modes: Vec<TransportMode>,
}

impl StrategySettings {
    /// Innovation never happens; every agent runs `strategy` each iteration.
    pub fn selection_only(strategy: Strategy) -> Self {
        Self {
            strategies: vec![StrategyWeight::new(strategy, 1.0)],
            fraction_of_iterations_to_disable_innovation: 1.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ReplanningResult<()> {
        let fraction = self.fraction_of_iterations_to_disable_innovation;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ReplanningError::Config(format!(
                "fraction_of_iterations_to_disable_innovation {fraction} outside [0, 1]"
            )));
        }
        if let Some(w) = self.strategies.iter().find(|w| !(w.weight >= 0.0 && w.weight.is_finite())) {
            return Err(ReplanningError::Config(format!(
                "{:?} has invalid weight {}",
                w.strategy, w.weight
            )));
        }
        // Once innovation is off, a selector must remain.
        if !self.strategies.iter().any(|w| !w.strategy.is_innovative() && w.weight > 0.0) {
            return Err(ReplanningError::Config(
                "strategy table needs a selector with positive weight".into(),
            ));
        }
        if self.strategies.len() > usize::from(u16::MAX) {
            return Err(ReplanningError::Config("too many strategies".into()));
        }
        let mutates = self
            .strategies
            .iter()
            .any(|w| w.strategy == Strategy::TimeAllocationMutator && w.weight > 0.0);
        if mutates && !(self.mutation_range > 0.0) {
            return Err(ReplanningError::Config(format!(
                "mutation_range {} must be positive",
                self.mutation_range
            )));
        }
        Ok(())
    }
}

impl Default for StrategySettings {
    fn default() -> Self {
        use TransportMode::*;
        Self {
            strategies: vec![
                StrategyWeight::new(Strategy::ChangeExpBeta, 0.85),
                StrategyWeight::new(Strategy::ReRoute, 0.05),
                StrategyWeight::new(Strategy::ChangeSingleTripMode, 0.05),
                StrategyWeight::new(Strategy::TimeAllocationMutator, 0.05),
            ],
            fraction_of_iterations_to_disable_innovation: 0.8,
            max_agent_plan_memory_size: 5,
            brain_exp_beta: 1.0,
            mutation_range: 1800.0,
            change_modes: vec![Car, Pt, Bicycle, Walk],
        }
    }
}
