//! Fluent builder for constructing a [`Controler`].

use std::sync::Arc;

use abm_core::StrategyId;
use abm_mobility::{LegRouter, Mobsim, TeleportationMobsim, TripRouter};
use abm_population::{MainModeIdentifier, Population, PriorityMainModeIdentifier};
use abm_replanning::{PlanStrategyModule, Replanner};
use abm_scoring::ScoringEngine;

use crate::{Config, Controler, ModeStatsTracker, RunError, RunResult, ScoreStatsTracker};

/// Fluent builder for [`Controler`].
///
/// # Required inputs
///
/// - [`Config`] - iterations, seed, strategy table, routing and scoring
///   parameters
/// - [`Population`] - persons with at least their initial plan
///
/// # Optional inputs (have defaults)
///
/// | Method                       | Default                                     |
/// |------------------------------|---------------------------------------------|
/// | `.mobsim(m)`                 | `TeleportationMobsim` over `config.routing` |
/// | `.router(r)`                 | `TripRouter` over `config.routing`          |
/// | `.main_mode_identifier(i)`   | `PriorityMainModeIdentifier`                |
/// | `.strategy_module(id, m)`    | built-in module of the strategy             |
///
/// # Example
///
/// ```rust,ignore
/// let mut controler = ControlerBuilder::new(config, population)
///     .strategy_module(StrategyId(1), Box::new(MyInnovation))
///     .build()?;
/// controler.run(&mut NoopListener)?;
/// ```
pub struct ControlerBuilder {
    config:     Config,
    population: Population,
    mobsim:     Option<Box<dyn Mobsim>>,
    router:     Option<Box<dyn LegRouter>>,
    identifier: Option<Arc<dyn MainModeIdentifier>>,
    modules:    Vec<(StrategyId, Box<dyn PlanStrategyModule>)>,
}

impl ControlerBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: Config, population: Population) -> Self {
        Self {
            config,
            population,
            mobsim:     None,
            router:     None,
            identifier: None,
            modules:    Vec::new(),
        }
    }

    /// Replace the reference mobsim.
    pub fn mobsim(mut self, mobsim: Box<dyn Mobsim>) -> Self {
        self.mobsim = Some(mobsim);
        self
    }

    /// Replace the router used for initial routing and by innovation modules.
    pub fn router(mut self, router: Box<dyn LegRouter>) -> Self {
        self.router = Some(router);
        self
    }

    /// Replace the main-mode identifier used by scoring, mode statistics and
    /// innovation modules.
    pub fn main_mode_identifier(mut self, identifier: Arc<dyn MainModeIdentifier>) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Run `module` for strategy `id` (its index in the strategy table)
    /// instead of the built-in one.
    pub fn strategy_module(mut self, id: StrategyId, module: Box<dyn PlanStrategyModule>) -> Self {
        self.modules.push((id, module));
        self
    }

    /// Validate the configuration, instantiate the components and return a
    /// ready-to-run [`Controler`].
    pub fn build(self) -> RunResult<Controler> {
        let config = self.config;
        config.validate()?;
        if self.population.is_empty() {
            log::warn!("building a controler for an empty population");
        }

        let seed = config.controler.seed;
        let stages = config.stage_activity_types();

        let identifier = self.identifier.unwrap_or_else(|| Arc::new(PriorityMainModeIdentifier));
        let mobsim = self
            .mobsim
            .unwrap_or_else(|| Box::new(TeleportationMobsim::new(&config.routing, seed)));
        let router = self
            .router
            .unwrap_or_else(|| Box::new(TripRouter::new(config.routing.clone())));

        let mut replanner = Replanner::new(config.strategy.clone(), config.controler.last_iteration, seed)
            .map_err(|e| RunError::Config(e.to_string()))?;
        for (id, module) in self.modules {
            replanner.set_module(id, module).map_err(|e| RunError::Config(e.to_string()))?;
        }

        let scoring = ScoringEngine::with_identifier(config.scoring.clone(), stages.clone(), identifier.clone());

        Ok(Controler {
            score_stats: ScoreStatsTracker::new(config.controler.first_iteration),
            mode_stats: ModeStatsTracker::new(),
            completed: None,
            population: self.population,
            config,
            stages,
            identifier,
            mobsim,
            router,
            scoring,
            replanner,
        })
    }
}
