//! Per-mode routing parameters.
//!
//! Every mode the scenario uses is either *teleported* (distance and travel
//! time derived from the beeline) or *network* (routed, then executed with
//! the routed travel time).
//!
//! | Default mode                       | Kind       | Speed (m/s) | Beeline factor |
//! |------------------------------------|------------|-------------|----------------|
//! | `walk` and the auxiliary walks     | teleported | 0.833       | 1.3            |
//! | `bicycle`                          | teleported | 3.139       | 1.3            |
//! | `car`, `ride`, `freight`           | network    | 8.333       | 1.3            |
//! | `pt`                               | network    | 5.556       | 1.5            |

use std::collections::BTreeMap;

use abm_core::TransportMode;

use crate::{MobilityError, MobilityResult};

// ── Teleported modes ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeleportedModeParams {
    /// Speed over the beeline, m/s.
    pub speed: f64,
    /// Experienced distance = beeline × factor.  Must be ≥ 1.
    pub beeline_distance_factor: f64,
    /// Relative travel-time perturbation `r`; durations are scaled by
    /// `1 + U(-r, r)`.  0 disables randomization.
    #[cfg_attr(feature = "serde", serde(default))]
    pub randomization: f64,
}

impl TeleportedModeParams {
    pub fn new(speed: f64, beeline_distance_factor: f64) -> Self {
        Self { speed, beeline_distance_factor, randomization: 0.0 }
    }

    pub fn with_randomization(mut self, randomization: f64) -> Self {
        self.randomization = randomization;
        self
    }

    pub fn validate(&self, mode: TransportMode) -> MobilityResult<()> {
        check_speed_and_factor(mode, self.speed, self.beeline_distance_factor)?;
        if !(0.0..1.0).contains(&self.randomization) {
            return Err(invalid(mode, format!("randomization {} outside [0, 1)", self.randomization)));
        }
        Ok(())
    }
}

// ── Network modes ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkModeParams {
    /// Average door-to-door speed of the main leg over the beeline, m/s.
    pub speed: f64,
    pub beeline_distance_factor: f64,
    /// Walking distance from an activity to the mode's access point, metres.
    #[cfg_attr(feature = "serde", serde(default))]
    pub access_distance: f64,
}

impl NetworkModeParams {
    pub fn validate(&self, mode: TransportMode) -> MobilityResult<()> {
        check_speed_and_factor(mode, self.speed, self.beeline_distance_factor)?;
        if !(self.access_distance >= 0.0 && self.access_distance.is_finite()) {
            return Err(invalid(mode, format!("access distance {}", self.access_distance)));
        }
        Ok(())
    }
}

// ── ModeRoutingParams ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ModeRoutingParams {
    Teleported(TeleportedModeParams),
    Network(NetworkModeParams),
}

// ── RoutingParams ─────────────────────────────────────────────────────────────

/// Routing parameters of every mode in the scenario.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RoutingParams {
    pub modes: BTreeMap<TransportMode, ModeRoutingParams>,
}

impl RoutingParams {
    pub fn empty() -> Self {
        Self { modes: BTreeMap::new() }
    }

    pub fn with_teleported(mut self, mode: TransportMode, params: TeleportedModeParams) -> Self {
        self.modes.insert(mode, ModeRoutingParams::Teleported(params));
        self
    }

    pub fn with_network(mut self, mode: TransportMode, params: NetworkModeParams) -> Self {
        self.modes.insert(mode, ModeRoutingParams::Network(params));
        self
    }

    pub fn get(&self, mode: TransportMode) -> MobilityResult<&ModeRoutingParams> {
        self.modes.get(&mode).ok_or(MobilityError::UnknownMode(mode))
    }

    pub fn teleported(&self, mode: TransportMode) -> Option<&TeleportedModeParams> {
        match self.modes.get(&mode) {
            Some(ModeRoutingParams::Teleported(p)) => Some(p),
            _ => None,
        }
    }

    pub fn network(&self, mode: TransportMode) -> Option<&NetworkModeParams> {
        match self.modes.get(&mode) {
            Some(ModeRoutingParams::Network(p)) => Some(p),
            _ => None,
        }
    }

    pub fn is_teleported(&self, mode: TransportMode) -> bool {
        self.teleported(mode).is_some()
    }

    /// Main modes that can be routed, in `TransportMode` order.
    pub fn main_modes(&self) -> impl Iterator<Item = TransportMode> + '_ {
        self.modes.keys().copied().filter(|m| !m.is_auxiliary_walk())
    }

    /// Validate every entry.  Network modes additionally need teleported
    /// `access_walk` and `egress_walk` parameters.
    pub fn validate(&self) -> MobilityResult<()> {
        for (&mode, params) in &self.modes {
            match params {
                ModeRoutingParams::Teleported(p) => p.validate(mode)?,
                ModeRoutingParams::Network(p) => {
                    p.validate(mode)?;
                    for aux in [TransportMode::AccessWalk, TransportMode::EgressWalk] {
                        if !self.is_teleported(aux) {
                            return Err(invalid(mode, format!("network mode requires teleported {aux}")));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for RoutingParams {
    fn default() -> Self {
        use TransportMode::*;
        let walk = TeleportedModeParams::new(3.0 / 3.6, 1.3);
        let road = NetworkModeParams { speed: 30.0 / 3.6, beeline_distance_factor: 1.3, access_distance: 100.0 };
        let mut params = Self::empty()
            .with_teleported(Bicycle, TeleportedModeParams::new(11.3 / 3.6, 1.3))
            .with_network(Car, road)
            .with_network(Ride, road)
            .with_network(Freight, road)
            .with_network(Pt, NetworkModeParams {
                speed: 20.0 / 3.6,
                beeline_distance_factor: 1.5,
                access_distance: 300.0,
            });
        for mode in [Walk, AccessWalk, EgressWalk, TransitWalk, NonNetworkWalk] {
            params = params.with_teleported(mode, walk);
        }
        params
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn invalid(mode: TransportMode, reason: String) -> MobilityError {
    MobilityError::InvalidParams { mode, reason }
}

fn check_speed_and_factor(mode: TransportMode, speed: f64, factor: f64) -> MobilityResult<()> {
    if !(speed > 0.0 && speed.is_finite()) {
        return Err(invalid(mode, format!("speed {speed} must be positive")));
    }
    if !(factor >= 1.0 && factor.is_finite()) {
        return Err(invalid(mode, format!("beeline distance factor {factor} must be >= 1")));
    }
    Ok(())
}
