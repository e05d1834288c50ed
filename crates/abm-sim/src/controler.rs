//! The `Controler` struct and its iteration loop.

use std::sync::Arc;

use log::{debug, info};

use abm_core::{AgentRng, RngStream};
use abm_mobility::{LegRouter, Mobsim, needs_routing, route_plan};
use abm_population::{MainModeIdentifier, Person, Plan, Population, StageActivityTypes, classify_trips};
use abm_replanning::{InnovationContext, ReplanDecision, Replanner};
use abm_scoring::ScoringEngine;

use crate::{
    Config, ControlerListener, IterationRecord, IterationSummary, ModeShares, ModeStatsTracker,
    RunError, RunResult, ScoreStatsTracker,
};

// ── Controler ─────────────────────────────────────────────────────────────────

/// The main run driver.
///
/// Holds the population and every component of the loop:
///
/// 1. **Replanning** (iterations after the first): every agent's decision is
///    computed from the unchanged population, then all are applied in
///    ascending `AgentId` order.
/// 2. **Mobsim**: the selected plans are executed into events.
/// 3. **Scoring**: every agent's events are scored; the scores are committed
///    only once every agent scored successfully.
/// 4. **Statistics** and listener callbacks.
///
/// Create via [`ControlerBuilder`][crate::ControlerBuilder].
pub struct Controler {
    pub(crate) config:      Config,
    pub(crate) population:  Population,
    pub(crate) stages:      StageActivityTypes,
    pub(crate) identifier:  Arc<dyn MainModeIdentifier>,
    pub(crate) mobsim:      Box<dyn Mobsim>,
    pub(crate) router:      Box<dyn LegRouter>,
    pub(crate) scoring:     ScoringEngine,
    pub(crate) replanner:   Replanner,
    pub(crate) score_stats: ScoreStatsTracker,
    pub(crate) mode_stats:  ModeStatsTracker,
    /// Last completed iteration.
    pub(crate) completed:   Option<u32>,
}

impl Controler {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run every iteration from `first_iteration` to `last_iteration`.
    ///
    /// Any error aborts the run.  Phases commit atomically, so the population
    /// reflects the last completed phase when an error is returned.
    pub fn run<L: ControlerListener + ?Sized>(&mut self, listener: &mut L) -> RunResult<()> {
        let first = self.config.controler.first_iteration;
        let last = self.config.controler.last_iteration;
        if self.completed.is_some() {
            return Err(RunError::Config("the controler has already run".into()));
        }
        info!(
            "run: iterations {first}..={last}, {} agents, {} strategies",
            self.population.len(),
            self.config.strategy.strategies.len()
        );

        self.prepare(first)?;
        listener.on_startup(&self.config, &self.population);

        for iteration in first..=last {
            self.run_iteration(iteration, listener)?;
            self.completed = Some(iteration);
        }

        listener.on_shutdown(last, &self.population);
        info!("run: finished after iteration {last}");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn into_population(self) -> Population {
        self.population
    }

    pub fn score_stats(&self) -> &ScoreStatsTracker {
        &self.score_stats
    }

    pub fn mode_stats(&self) -> &ModeStatsTracker {
        &self.mode_stats
    }

    /// The last iteration that completed, `None` before the run.
    pub fn completed_iteration(&self) -> Option<u32> {
        self.completed
    }

    // ── Preparation ───────────────────────────────────────────────────────

    /// Route every plan that still has unrouted legs, keeping each trip's
    /// main mode.  Also rejects plans that do not segment into trips.
    fn prepare(&mut self, first: u32) -> RunResult<()> {
        let seed = self.config.controler.seed;
        let stages = &self.stages;
        let identifier = &*self.identifier;
        let router = &*self.router;

        let routed: Vec<Vec<(usize, Plan)>> = collect_agents(map_agents(self.population.persons(), |person| {
            let agent = person.id();
            let mut out = Vec::new();
            for (index, plan) in person.plans().iter().enumerate() {
                let modes = classify_trips(plan, stages, identifier)
                    .map_err(|e| RunError::from_population(first, Some(agent), e))?;
                if needs_routing(plan) {
                    let mut rng = AgentRng::keyed(seed, agent, RngStream::Strategy { iteration: first });
                    let plan = route_plan(router, agent, plan, stages, &modes, &mut rng)
                        .map_err(|e| RunError::from_mobility(first, e))?;
                    out.push((index, plan));
                }
            }
            Ok(out)
        }))?;

        let mut count = 0usize;
        for (person, plans) in self.population.persons_mut().iter_mut().zip(routed) {
            for (index, plan) in plans {
                let agent = person.id();
                person
                    .replace_plan(index, plan)
                    .map_err(|e| RunError::from_population(first, Some(agent), e))?;
                count += 1;
            }
        }
        debug!("prepare: routed {count} plans");
        Ok(())
    }

    // ── One iteration ─────────────────────────────────────────────────────

    fn run_iteration<L: ControlerListener + ?Sized>(&mut self, iteration: u32, listener: &mut L) -> RunResult<()> {
        info!("iteration {iteration}: start");
        listener.on_iteration_start(iteration);

        // ── Phase 0: replanning (decide all, then apply) ──────────────────
        if iteration > self.config.controler.first_iteration {
            let (innovated, selected) = self.replan(iteration)?;
            listener.on_replanning(iteration, innovated, selected);
        }

        // ── Phase 1: mobsim ───────────────────────────────────────────────
        let events = self
            .mobsim
            .run(iteration, &self.population)
            .map_err(|e| RunError::from_mobility(iteration, e))?;
        debug!("iteration {iteration}: mobsim produced events for {} agents", events.len());
        listener.on_events(iteration, &events);

        // ── Phase 2: scoring + mode classification, then commit ───────────
        let scored = self
            .scoring
            .score_all(&self.population, &events)
            .map_err(|e| RunError::from_scoring(iteration, e))?;
        let modes = ModeShares::compute(iteration, &self.population, &self.stages, &*self.identifier)?;

        let learning_rate = self.config.controler.score_learning_rate;
        for sp in scored {
            let person = self.population.get_mut(sp.agent).ok_or_else(|| RunError::MalformedPlan {
                iteration,
                agent: Some(sp.agent),
                reason: "scored agent is not in the population".into(),
            })?;
            person
                .apply_score(sp, learning_rate)
                .map_err(|e| RunError::from_population(iteration, Some(sp.agent), e))?;
        }

        // ── Phase 3: statistics ───────────────────────────────────────────
        let record: IterationRecord = self.score_stats.record(iteration, &self.population)?;
        self.mode_stats.push(modes.clone())?;
        info!(
            "iteration {iteration}: executed {:.4}, average {:.4}, best {:.4}, worst {:.4}",
            record.executed, record.average, record.best, record.worst
        );

        // ── Phase 4: listeners ────────────────────────────────────────────
        listener.on_iteration_end(&IterationSummary {
            iteration,
            scores: &record,
            modes: &modes,
            population: &self.population,
        });
        Ok(())
    }

    /// Returns `(innovated, selected)` agent counts.
    fn replan(&mut self, iteration: u32) -> RunResult<(usize, usize)> {
        let ctx = InnovationContext {
            iteration,
            router: &*self.router,
            stages: &self.stages,
            identifier: &*self.identifier,
        };
        let replanner: &Replanner = &self.replanner;
        let innovation = replanner.scheduler().innovation_enabled(iteration);

        let decisions: Vec<ReplanDecision> = collect_agents(map_agents(self.population.persons(), |person| {
            replanner
                .decide(&ctx, person)
                .map_err(|e| RunError::from_replanning(iteration, person.id(), e))
        }))?;

        let innovated = decisions.iter().filter(|d| d.is_innovation()).count();
        let selected = decisions.len() - innovated;
        let max_plans = replanner.max_plans();

        for (person, decision) in self.population.persons_mut().iter_mut().zip(decisions) {
            let agent = person.id();
            decision
                .apply(person, max_plans)
                .map_err(|e| RunError::from_replanning(iteration, agent, e))?;
        }
        debug!(
            "iteration {iteration}: replanning done (innovation {}), {innovated} new plans, {selected} selections",
            if innovation { "on" } else { "off" }
        );
        Ok((innovated, selected))
    }
}

// ── Per-agent fan-out ─────────────────────────────────────────────────────────

/// Apply `f` to every person, in population order.  With the `parallel`
/// feature the calls run on Rayon's thread pool; the output order is the same.
fn map_agents<T, F>(persons: &[Person], f: F) -> Vec<RunResult<T>>
where
    T: Send,
    F: Fn(&Person) -> RunResult<T> + Sync + Send,
{
    #[cfg(not(feature = "parallel"))]
    {
        persons.iter().map(f).collect()
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        persons.par_iter().map(f).collect()
    }
}

/// First error in `AgentId` order, otherwise every result.
fn collect_agents<T>(results: Vec<RunResult<T>>) -> RunResult<Vec<T>> {
    results.into_iter().collect()
}
