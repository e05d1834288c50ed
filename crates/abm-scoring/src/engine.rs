//! `ScoringEngine` - turns event streams into `ScoredPlan`s.

use std::sync::Arc;

use log::debug;

use abm_core::AgentId;
use abm_mobility::{Event, EventsByAgent};
use abm_population::{
    MainModeIdentifier, Person, Population, PriorityMainModeIdentifier, ScoredPlan,
    StageActivityTypes,
};

use crate::{AgentScorer, ScoringParameters, ScoringResult};

/// Scores experienced days with one fixed parameter set.
///
/// The engine never touches the population: it returns [`ScoredPlan`]
/// values and the caller decides when to commit them.
pub struct ScoringEngine {
    params: ScoringParameters,
    stages: StageActivityTypes,
    identifier: Arc<dyn MainModeIdentifier>,
}

impl ScoringEngine {
    /// Engine using [`PriorityMainModeIdentifier`] for trip constants.
    pub fn new(params: ScoringParameters, stages: StageActivityTypes) -> Self {
        Self::with_identifier(params, stages, Arc::new(PriorityMainModeIdentifier))
    }

    pub fn with_identifier(
        params: ScoringParameters,
        stages: StageActivityTypes,
        identifier: Arc<dyn MainModeIdentifier>,
    ) -> Self {
        Self { params, stages, identifier }
    }

    pub fn params(&self) -> &ScoringParameters {
        &self.params
    }

    /// Score one agent's day.  `events` must be the agent's complete,
    /// time-ordered event list; `plan_index` names the plan that was executed.
    pub fn score_agent(&self, agent: AgentId, plan_index: usize, events: &[Event]) -> ScoringResult<ScoredPlan> {
        let mut scorer = AgentScorer::new(agent, &self.params, &self.stages, self.identifier.as_ref());
        for event in events {
            scorer.handle_event(event)?;
        }
        Ok(ScoredPlan { agent, plan_index, score: scorer.finish()? })
    }

    /// Score the selected plan of every person, in `AgentId` order.
    ///
    /// Persons without events score 0.  Fails on the first error without
    /// producing any result.
    pub fn score_all(&self, population: &Population, events: &EventsByAgent) -> ScoringResult<Vec<ScoredPlan>> {
        let score_one = |p: &Person| {
            let day = events.get(&p.id()).map(Vec::as_slice).unwrap_or(&[]);
            self.score_agent(p.id(), p.selected_index(), day)
        };

        #[cfg(not(feature = "parallel"))]
        let scored: Vec<ScoredPlan> =
            population.persons().iter().map(score_one).collect::<ScoringResult<_>>()?;

        #[cfg(feature = "parallel")]
        let scored: Vec<ScoredPlan> = {
            use rayon::prelude::*;
            population.persons().par_iter().map(score_one).collect::<ScoringResult<_>>()?
        };

        debug!("scoring: {} plans scored", scored.len());
        Ok(scored)
    }
}
