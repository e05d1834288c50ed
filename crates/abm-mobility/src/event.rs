//! Timed per-agent events emitted by a mobsim.
//!
//! For one leg the order is always
//! `Departure → (Teleportation | NetworkTravel) → Arrival`, each with the
//! same `leg_index`.  Activities are bracketed by `ActivityStart` (omitted for
//! the first activity of the day) and `ActivityEnd` (omitted for the last).

use std::collections::BTreeMap;

use abm_core::{ActivityType, AgentId, TransportMode};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    ActivityStart { time: f64, agent: AgentId, act_type: ActivityType },
    ActivityEnd   { time: f64, agent: AgentId, act_type: ActivityType },
    Departure     { time: f64, agent: AgentId, leg_index: u32, mode: TransportMode },
    /// A teleported leg completed; `time` is the arrival time.
    Teleportation {
        time:        f64,
        agent:       AgentId,
        leg_index:   u32,
        mode:        TransportMode,
        distance:    f64,
        travel_time: f64,
    },
    /// A network leg completed on its routed path; `time` is the arrival time.
    NetworkTravel {
        time:        f64,
        agent:       AgentId,
        leg_index:   u32,
        mode:        TransportMode,
        distance:    f64,
        travel_time: f64,
    },
    Arrival       { time: f64, agent: AgentId, leg_index: u32, mode: TransportMode },
}

impl Event {
    #[inline]
    pub fn time(&self) -> f64 {
        match self {
            Event::ActivityStart { time, .. }
            | Event::ActivityEnd { time, .. }
            | Event::Departure { time, .. }
            | Event::Teleportation { time, .. }
            | Event::NetworkTravel { time, .. }
            | Event::Arrival { time, .. } => *time,
        }
    }

    #[inline]
    pub fn agent(&self) -> AgentId {
        match self {
            Event::ActivityStart { agent, .. }
            | Event::ActivityEnd { agent, .. }
            | Event::Departure { agent, .. }
            | Event::Teleportation { agent, .. }
            | Event::NetworkTravel { agent, .. }
            | Event::Arrival { agent, .. } => *agent,
        }
    }
}

/// One time-ordered event list per agent, iterated in `AgentId` order.
pub type EventsByAgent = BTreeMap<AgentId, Vec<Event>>;

/// Receives events after a mobsim run.
///
/// Handlers see every agent's events in `AgentId` order, each agent's list in
/// time order.
pub trait EventHandler {
    fn handle_event(&mut self, event: &Event);

    /// Called once before the events of `iteration` are dispatched.
    fn reset(&mut self, _iteration: u32) {}
}

/// Feed every event of one iteration to `handler`.
pub fn dispatch<H: EventHandler + ?Sized>(iteration: u32, events: &EventsByAgent, handler: &mut H) {
    handler.reset(iteration);
    for event in events.values().flatten() {
        handler.handle_event(event);
    }
}
