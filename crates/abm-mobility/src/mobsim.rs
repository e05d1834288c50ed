//! Plan execution: the `Mobsim` trait and the reference teleporting mobsim.

use log::debug;

use abm_core::time::DAY_SECS;
use abm_core::{AgentRng, RngStream};
use abm_population::{Person, PlanElement, Population};

use crate::{
    Event, EventsByAgent, MobilityError, MobilityResult, RoutingParams, TeleportationModel,
};

/// Executes the selected plans of a population for one simulated day.
///
/// # Contract
///
/// - Every agent of `population` gets an entry in the result, even if it
///   only stays at home.  A one-activity plan ends that activity at
///   midnight, so it is scored over the whole day.
/// - Each agent's events are in non-decreasing time order.
/// - Any error aborts the whole iteration; no partial result is returned.
pub trait Mobsim: Send + Sync {
    fn run(&self, iteration: u32, population: &Population) -> MobilityResult<EventsByAgent>;
}

/// Executes teleported legs with the [`TeleportationModel`] and network legs
/// with their routed travel time and distance.
///
/// Teleported legs are always recomputed from the coordinates of the
/// surrounding activities, whatever route the plan carries.
#[derive(Clone, Debug)]
pub struct TeleportationMobsim {
    teleport: TeleportationModel,
    seed: u64,
}

impl TeleportationMobsim {
    pub fn new(routing: &RoutingParams, seed: u64) -> Self {
        Self { teleport: TeleportationModel::from_routing(routing), seed }
    }

    pub fn model(&self) -> &TeleportationModel {
        &self.teleport
    }

    /// Execute one agent's selected plan.
    pub fn execute(&self, iteration: u32, person: &Person) -> MobilityResult<Vec<Event>> {
        let agent = person.id();
        let elements = person.selected_plan().elements();
        let last = elements.len().saturating_sub(1);

        let mut events = Vec::with_capacity(elements.len() * 2);
        let mut now = 0.0;
        let mut leg_index = 0u32;

        for (i, element) in elements.iter().enumerate() {
            match element {
                PlanElement::Activity(act) => {
                    if i > 0 {
                        events.push(Event::ActivityStart { time: now, agent, act_type: act.act_type.clone() });
                    }
                    if i < last {
                        now = act.departure_after(now).ok_or_else(|| MobilityError::Execution {
                            agent,
                            reason: format!("activity {i} ({}) has neither end time nor duration", act.act_type),
                        })?;
                        events.push(Event::ActivityEnd { time: now, agent, act_type: act.act_type.clone() });
                    } else if i == 0 {
                        events.push(Event::ActivityEnd { time: DAY_SECS, agent, act_type: act.act_type.clone() });
                    }
                }
                PlanElement::Leg(leg) => {
                    let mode = leg.mode;
                    events.push(Event::Departure { time: now, agent, leg_index, mode });

                    if let Some(params) = self.teleport.params(mode) {
                        let (Some(from), Some(to)) = (
                            i.checked_sub(1).and_then(|j| elements.get(j)).and_then(PlanElement::as_activity),
                            elements.get(i + 1).and_then(PlanElement::as_activity),
                        ) else {
                            return Err(MobilityError::Execution {
                                agent,
                                reason: format!("leg {leg_index} is not between two activities"),
                            });
                        };
                        let mut rng = AgentRng::keyed(
                            self.seed,
                            agent,
                            RngStream::Teleportation { iteration, leg: leg_index },
                        );
                        let travel = params.travel(from.coord.distance_m(to.coord), &mut rng)?;
                        now += travel.travel_time;
                        events.push(Event::Teleportation {
                            time: now,
                            agent,
                            leg_index,
                            mode,
                            distance: travel.distance,
                            travel_time: travel.travel_time,
                        });
                    } else {
                        let route = leg.route.ok_or(MobilityError::Unrouted { agent, leg_index, mode })?;
                        now += route.travel_time;
                        events.push(Event::NetworkTravel {
                            time: now,
                            agent,
                            leg_index,
                            mode,
                            distance: route.distance,
                            travel_time: route.travel_time,
                        });
                    }

                    events.push(Event::Arrival { time: now, agent, leg_index, mode });
                    leg_index += 1;
                }
            }
        }
        Ok(events)
    }
}

impl Mobsim for TeleportationMobsim {
    fn run(&self, iteration: u32, population: &Population) -> MobilityResult<EventsByAgent> {
        #[cfg(not(feature = "parallel"))]
        let days: Vec<_> = population
            .persons()
            .iter()
            .map(|p| self.execute(iteration, p).map(|events| (p.id(), events)))
            .collect::<MobilityResult<_>>()?;

        #[cfg(feature = "parallel")]
        let days: Vec<_> = {
            use rayon::prelude::*;
            population
                .persons()
                .par_iter()
                .map(|p| self.execute(iteration, p).map(|events| (p.id(), events)))
                .collect::<MobilityResult<_>>()?
        };

        debug!(
            "mobsim: iteration {iteration}, {} agents, {} events",
            days.len(),
            days.iter().map(|(_, e)| e.len()).sum::<usize>()
        );
        Ok(days.into_iter().collect())
    }
}
