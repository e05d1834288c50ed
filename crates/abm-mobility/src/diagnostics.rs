//! Per-agent record of teleported legs.

use std::collections::BTreeMap;

use abm_core::{AgentId, TransportMode};

use crate::{Event, EventHandler};

/// One teleported leg as seen in the event stream.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TeleportedLeg {
    pub leg_index: u32,
    pub mode: TransportMode,
    pub distance: f64,
    pub travel_time: f64,
}

/// Collects every `Teleportation` event of an iteration, per agent in leg
/// order.  Used to verify the teleportation model from the outside.
#[derive(Clone, Debug, Default)]
pub struct TeleportationDiagnostics {
    legs: BTreeMap<AgentId, Vec<TeleportedLeg>>,
}

impl TeleportationDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn legs(&self, agent: AgentId) -> &[TeleportedLeg] {
        self.legs.get(&agent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn distances(&self, agent: AgentId) -> Vec<f64> {
        self.legs(agent).iter().map(|l| l.distance).collect()
    }

    pub fn travel_times(&self, agent: AgentId) -> Vec<f64> {
        self.legs(agent).iter().map(|l| l.travel_time).collect()
    }

    /// Agents with at least one teleported leg.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.legs.keys().copied()
    }
}

impl EventHandler for TeleportationDiagnostics {
    fn handle_event(&mut self, event: &Event) {
        if let Event::Teleportation { agent, leg_index, mode, distance, travel_time, .. } = *event {
            self.legs.entry(agent).or_default().push(TeleportedLeg {
                leg_index,
                mode,
                distance,
                travel_time,
            });
        }
    }

    fn reset(&mut self, _iteration: u32) {
        self.legs.clear();
    }
}
