//! `Replanner` - strategy modules wired to the scheduler.

use abm_core::{AgentId, AgentRng, RngStream, StrategyId};
use abm_population::{Person, Plan};

use crate::{
    Assignment, ChangeSingleTripMode, InnovationContext, PlanStrategyModule, ReRoute,
    ReplanningError, ReplanningResult, ReplanningScheduler, Strategy, StrategySettings,
    TimeAllocationMutator, prune_plans,
};

/// What replanning does to one person.
#[derive(Clone, Debug, PartialEq)]
pub enum ReplanAction {
    /// Select the existing plan at this index.
    Select(usize),
    /// Add this plan and select it.
    AddPlan(Plan),
}

/// A computed, not yet applied, replanning step for one person.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplanDecision {
    pub agent: AgentId,
    pub strategy: StrategyId,
    pub action: ReplanAction,
}

impl ReplanDecision {
    /// Apply the decision to `person` and trim its plan memory.
    pub fn apply(self, person: &mut Person, max_plans: usize) -> ReplanningResult<()> {
        match self.action {
            ReplanAction::Select(index) => person.select(index)?,
            ReplanAction::AddPlan(plan) => {
                person.add_and_select(plan);
            }
        }
        prune_plans(person, max_plans)?;
        Ok(())
    }

    pub fn is_innovation(&self) -> bool {
        matches!(self.action, ReplanAction::AddPlan(_))
    }
}

/// Scheduler plus one module per innovative strategy of the table.
pub struct Replanner {
    scheduler: ReplanningScheduler,
    /// Parallel to the strategy table; `None` for selectors.
    modules: Vec<Option<Box<dyn PlanStrategyModule>>>,
    seed: u64,
}

impl Replanner {
    /// Validate `settings` and instantiate the built-in module of every
    /// innovative strategy in the table.
    pub fn new(settings: StrategySettings, last_iteration: u32, seed: u64) -> ReplanningResult<Self> {
        let modules = settings
            .strategies
            .iter()
            .map(|w| default_module(w.strategy, &settings))
            .collect();
        let scheduler = ReplanningScheduler::new(settings, last_iteration, seed)?;
        Ok(Self { scheduler, modules, seed })
    }

    /// Replace the module behind strategy `id`.
    pub fn set_module(&mut self, id: StrategyId, module: Box<dyn PlanStrategyModule>) -> ReplanningResult<()> {
        let slot = self.modules.get_mut(id.index()).ok_or_else(|| {
            ReplanningError::Config(format!("{id} is not in the strategy table"))
        })?;
        *slot = Some(module);
        Ok(())
    }

    pub fn scheduler(&self) -> &ReplanningScheduler {
        &self.scheduler
    }

    pub fn max_plans(&self) -> usize {
        self.scheduler.settings().max_agent_plan_memory_size
    }

    /// Decide what `person` does in `ctx.iteration`.  Reads only.
    pub fn decide(&self, ctx: &InnovationContext<'_>, person: &Person) -> ReplanningResult<ReplanDecision> {
        let agent = person.id();
        let iteration = ctx.iteration;
        let assignment = self.scheduler.assign(iteration, agent)?;
        let mut rng = AgentRng::keyed(self.seed, agent, RngStream::Strategy { iteration });

        let action = match assignment {
            Assignment::Exploit { selector, .. } => ReplanAction::Select(selector.select(person, &mut rng)),
            Assignment::Innovate { id, .. } => {
                let module = self
                    .modules
                    .get(id.index())
                    .and_then(Option::as_deref)
                    .ok_or(ReplanningError::MissingModule { strategy: id })?;
                ReplanAction::AddPlan(module.innovate(ctx, person, &mut rng)?)
            }
        };
        Ok(ReplanDecision { agent, strategy: assignment.id(), action })
    }
}

fn default_module(strategy: Strategy, settings: &StrategySettings) -> Option<Box<dyn PlanStrategyModule>> {
    match strategy {
        Strategy::ReRoute => Some(Box::new(ReRoute)),
        Strategy::ChangeSingleTripMode => Some(Box::new(ChangeSingleTripMode::new(settings.change_modes.clone()))),
        Strategy::TimeAllocationMutator => Some(Box::new(TimeAllocationMutator::new(settings.mutation_range))),
        Strategy::ChangeExpBeta | Strategy::BestScore | Strategy::KeepLastSelected | Strategy::SelectRandom => None,
    }
}
