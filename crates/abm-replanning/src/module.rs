//! Innovation: the `PlanStrategyModule` trait and the built-in modules.

use abm_core::time::DAY_SECS;
use abm_core::{AgentRng, TransportMode};
use abm_mobility::{LegRouter, route_plan};
use abm_population::{
    Activity, Leg, MainModeIdentifier, Person, Plan, PlanElement, StageActivityTypes,
    classify_trips,
};

use crate::{ReplanningError, ReplanningResult};

/// Read-only collaborators available to every module.
#[derive(Clone, Copy)]
pub struct InnovationContext<'a> {
    pub iteration: u32,
    pub router: &'a dyn LegRouter,
    pub stages: &'a StageActivityTypes,
    pub identifier: &'a dyn MainModeIdentifier,
}

/// Derives a new plan from a person's selected plan.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; the loop may innovate for many
/// agents concurrently.  All randomness must come from `rng`.
pub trait PlanStrategyModule: Send + Sync {
    fn name(&self) -> &str;

    fn innovate(
        &self,
        ctx: &InnovationContext<'_>,
        person: &Person,
        rng: &mut AgentRng,
    ) -> ReplanningResult<Plan>;
}

// ── ReRoute ───────────────────────────────────────────────────────────────────

/// Route every trip again with its current main mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReRoute;

impl PlanStrategyModule for ReRoute {
    fn name(&self) -> &str {
        "ReRoute"
    }

    fn innovate(
        &self,
        ctx: &InnovationContext<'_>,
        person: &Person,
        rng: &mut AgentRng,
    ) -> ReplanningResult<Plan> {
        let plan = person.selected_plan();
        let modes = classify_trips(plan, ctx.stages, ctx.identifier)?;
        Ok(route_plan(ctx.router, person.id(), plan, ctx.stages, &modes, rng)?)
    }
}

// ── ChangeSingleTripMode ──────────────────────────────────────────────────────

/// Give one random trip a different main mode, then re-route the plan.
#[derive(Clone, Debug)]
pub struct ChangeSingleTripMode {
    modes: Vec<TransportMode>,
}

impl ChangeSingleTripMode {
    pub fn new(modes: Vec<TransportMode>) -> Self {
        Self { modes }
    }
}

impl PlanStrategyModule for ChangeSingleTripMode {
    fn name(&self) -> &str {
        "ChangeSingleTripMode"
    }

    fn innovate(
        &self,
        ctx: &InnovationContext<'_>,
        person: &Person,
        rng: &mut AgentRng,
    ) -> ReplanningResult<Plan> {
        let plan = person.selected_plan();
        let mut modes = classify_trips(plan, ctx.stages, ctx.identifier)?;
        if !modes.is_empty() {
            let trip = rng.gen_range(0..modes.len());
            let alternatives: Vec<TransportMode> =
                self.modes.iter().copied().filter(|&m| m != modes[trip]).collect();
            if let Some(&mode) = rng.choose(&alternatives) {
                modes[trip] = mode;
            }
        }
        Ok(route_plan(ctx.router, person.id(), plan, ctx.stages, &modes, rng)?)
    }
}

// ── TimeAllocationMutator ─────────────────────────────────────────────────────

/// Shift every activity end time and duration by `U(-range, range)` seconds.
///
/// Stage activities and the last activity are left alone.  Shifted times are
/// clamped to `[0, 24 h]`; durations to `≥ 0`.  Routes are kept, but planned
/// leg departure times are cleared since they no longer hold.
#[derive(Clone, Copy, Debug)]
pub struct TimeAllocationMutator {
    range: f64,
}

impl TimeAllocationMutator {
    pub fn new(range: f64) -> Self {
        Self { range }
    }
}

impl PlanStrategyModule for TimeAllocationMutator {
    fn name(&self) -> &str {
        "TimeAllocationMutator"
    }

    fn innovate(
        &self,
        ctx: &InnovationContext<'_>,
        person: &Person,
        rng: &mut AgentRng,
    ) -> ReplanningResult<Plan> {
        if !(self.range > 0.0) {
            return Err(ReplanningError::Innovation {
                agent: person.id(),
                reason: format!("mutation range {} must be positive", self.range),
            });
        }
        let elements = person.selected_plan().elements();
        let last = elements.len().saturating_sub(1);
        let mut shift = |t: f64| t + rng.gen_range(-self.range..=self.range);

        let mutated = elements
            .iter()
            .enumerate()
            .map(|(i, e)| match e {
                PlanElement::Activity(a) if i < last && !ctx.stages.is_stage(&a.act_type) => {
                    PlanElement::Activity(Activity {
                        end_time: a.end_time.map(|t| shift(t).clamp(0.0, DAY_SECS)),
                        max_duration: a.max_duration.map(|d| shift(d).max(0.0)),
                        ..a.clone()
                    })
                }
                PlanElement::Leg(leg) => PlanElement::Leg(Leg { departure_time: None, ..leg.clone() }),
                other => other.clone(),
            })
            .collect();
        Ok(Plan::new(mutated)?)
    }
}
