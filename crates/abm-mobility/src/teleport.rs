//! Teleported-mode travel model.
//!
//! ```text
//! distance    = beeline × beeline_distance_factor
//! travel_time = beeline / speed × (1 + U(-r, r))
//! ```
//!
//! `speed` is defined over the beeline, so the configured value is recovered
//! from an emitted leg as `(distance / beeline_distance_factor) / travel_time`
//! (exactly when `r = 0`, within `r` relative error otherwise).

use std::collections::BTreeMap;

use abm_core::{AgentRng, TransportMode};

use crate::{MobilityError, MobilityResult, RoutingParams, TeleportedModeParams};

/// Experienced distance (m) and duration (s) of one teleported leg.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TeleportedTravel {
    pub distance: f64,
    pub travel_time: f64,
}

impl TeleportedTravel {
    /// Speed over the beeline implied by this leg, `None` for a zero-time leg.
    pub fn beeline_speed(&self, beeline_distance_factor: f64) -> Option<f64> {
        (self.travel_time > 0.0).then(|| self.distance / beeline_distance_factor / self.travel_time)
    }
}

impl TeleportedModeParams {
    /// Travel for one leg.  `rng` is only drawn from when randomization is on.
    pub fn travel(&self, beeline_m: f64, rng: &mut AgentRng) -> MobilityResult<TeleportedTravel> {
        if !(beeline_m >= 0.0 && beeline_m.is_finite()) {
            return Err(MobilityError::InvalidDistance(beeline_m));
        }
        let mut travel_time = beeline_m / self.speed;
        if self.randomization > 0.0 {
            let r = self.randomization;
            travel_time *= 1.0 + rng.gen_range(-r..=r);
        }
        Ok(TeleportedTravel { distance: beeline_m * self.beeline_distance_factor, travel_time })
    }
}

/// Lookup table of teleported modes.
#[derive(Clone, Debug, Default)]
pub struct TeleportationModel {
    modes: BTreeMap<TransportMode, TeleportedModeParams>,
}

impl TeleportationModel {
    /// Collect the teleported entries of `routing`.
    pub fn from_routing(routing: &RoutingParams) -> Self {
        let modes = routing
            .modes
            .keys()
            .filter_map(|&m| routing.teleported(m).map(|p| (m, *p)))
            .collect();
        Self { modes }
    }

    pub fn insert(&mut self, mode: TransportMode, params: TeleportedModeParams) {
        self.modes.insert(mode, params);
    }

    pub fn params(&self, mode: TransportMode) -> Option<&TeleportedModeParams> {
        self.modes.get(&mode)
    }

    #[inline]
    pub fn is_teleported(&self, mode: TransportMode) -> bool {
        self.modes.contains_key(&mode)
    }

    /// Distance and travel time of a `mode` leg over `beeline_m` metres.
    ///
    /// # Errors
    ///
    /// `UnknownMode` if `mode` is not teleported; `InvalidDistance` for a
    /// negative or non-finite beeline.
    pub fn travel(
        &self,
        mode: TransportMode,
        beeline_m: f64,
        rng: &mut AgentRng,
    ) -> MobilityResult<TeleportedTravel> {
        self.params(mode)
            .ok_or(MobilityError::UnknownMode(mode))?
            .travel(beeline_m, rng)
    }
}
