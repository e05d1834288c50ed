//! Scoring parameters.
//!
//! Marginal utilities are per hour (`β_perf`, `β_late`, `β_trav`, …) or per
//! metre (`β_dist`); durations and times are in seconds.  Penalties are
//! expressed as negative marginal utilities.

use std::collections::BTreeMap;

use abm_core::TransportMode;
use abm_core::time::HOUR_SECS;

use crate::{ScoringError, ScoringResult};

// ── ActivityParams ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivityParams {
    /// Typical duration, seconds.
    pub typical_duration: f64,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub priority: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub opening_time: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub closing_time: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub latest_start_time: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub earliest_end_time: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub minimal_duration: Option<f64>,
}

#[cfg(feature = "serde")]
fn one() -> f64 {
    1.0
}

impl ActivityParams {
    pub fn new(typical_duration: f64) -> Self {
        Self {
            typical_duration,
            priority: 1.0,
            opening_time: None,
            closing_time: None,
            latest_start_time: None,
            earliest_end_time: None,
            minimal_duration: None,
        }
    }

    pub fn with_opening_hours(mut self, opening: f64, closing: f64) -> Self {
        self.opening_time = Some(opening);
        self.closing_time = Some(closing);
        self
    }

    pub fn with_latest_start(mut self, t: f64) -> Self {
        self.latest_start_time = Some(t);
        self
    }

    pub fn with_earliest_end(mut self, t: f64) -> Self {
        self.earliest_end_time = Some(t);
        self
    }

    pub fn with_minimal_duration(mut self, secs: f64) -> Self {
        self.minimal_duration = Some(secs);
        self
    }

    /// Duration (s) at which the performance term is zero.
    #[inline]
    pub fn zero_utility_duration(&self) -> f64 {
        let typ_h = self.typical_duration / HOUR_SECS;
        self.typical_duration * (-10.0 / (typ_h / self.priority)).exp()
    }
}

// ── ModeParams ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModeParams {
    /// Added once per trip with this main mode.
    pub constant: f64,
    /// Utils per hour travelled.
    pub marginal_utility_of_traveling: f64,
    /// Utils per metre.
    pub marginal_utility_of_distance: f64,
    /// Money per metre; negative for a cost.
    pub monetary_distance_rate: f64,
}

impl ModeParams {
    pub fn new(constant: f64, marginal_utility_of_traveling: f64) -> Self {
        Self { constant, marginal_utility_of_traveling, ..Self::default() }
    }

    pub fn with_monetary_distance_rate(mut self, rate: f64) -> Self {
        self.monetary_distance_rate = rate;
        self
    }

    pub fn with_marginal_utility_of_distance(mut self, per_m: f64) -> Self {
        self.marginal_utility_of_distance = per_m;
        self
    }
}

// ── ScoringParameters ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoringParameters {
    pub marginal_utility_of_performing: f64,
    pub late_arrival: f64,
    pub early_departure: f64,
    pub too_short: f64,
    pub waiting: f64,
    pub marginal_utility_of_money: f64,
    /// Keyed by activity type name (`"home"`, `"work"`, …).
    pub activities: BTreeMap<String, ActivityParams>,
    pub modes: BTreeMap<TransportMode, ModeParams>,
}

impl ScoringParameters {
    /// Global marginal utilities only; no activity or mode entries.
    pub fn empty() -> Self {
        Self {
            marginal_utility_of_performing: 6.0,
            late_arrival: -18.0,
            early_departure: 0.0,
            too_short: 0.0,
            waiting: 0.0,
            marginal_utility_of_money: 1.0,
            activities: BTreeMap::new(),
            modes: BTreeMap::new(),
        }
    }

    pub fn with_activity(mut self, act_type: impl Into<String>, params: ActivityParams) -> Self {
        self.activities.insert(act_type.into(), params);
        self
    }

    pub fn with_mode(mut self, mode: TransportMode, params: ModeParams) -> Self {
        self.modes.insert(mode, params);
        self
    }

    pub fn activity(&self, act_type: &str) -> Option<&ActivityParams> {
        self.activities.get(act_type)
    }

    pub fn mode(&self, mode: TransportMode) -> Option<&ModeParams> {
        self.modes.get(&mode)
    }

    pub fn validate(&self) -> ScoringResult<()> {
        for (name, a) in &self.activities {
            if !(a.typical_duration > 0.0 && a.typical_duration.is_finite()) {
                return Err(ScoringError::InvalidParams(format!(
                    "activity {name}: typical duration {} must be positive",
                    a.typical_duration
                )));
            }
            if !(a.priority > 0.0) {
                return Err(ScoringError::InvalidParams(format!(
                    "activity {name}: priority {} must be positive",
                    a.priority
                )));
            }
            if let (Some(open), Some(close)) = (a.opening_time, a.closing_time) {
                if open > close {
                    return Err(ScoringError::InvalidParams(format!(
                        "activity {name}: opens at {open} after closing at {close}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ScoringParameters {
    fn default() -> Self {
        use TransportMode::*;
        let h = HOUR_SECS;
        let mut params = Self::empty()
            .with_activity("home", ActivityParams::new(12.0 * h))
            .with_activity("work", ActivityParams::new(8.0 * h).with_opening_hours(6.0 * h, 20.0 * h))
            .with_activity("education", ActivityParams::new(6.0 * h).with_opening_hours(7.0 * h, 18.0 * h))
            .with_activity("shop", ActivityParams::new(1.0 * h).with_opening_hours(8.0 * h, 20.0 * h))
            .with_activity("leisure", ActivityParams::new(2.0 * h))
            .with_activity("other", ActivityParams::new(1.0 * h))
            .with_mode(Car, ModeParams::new(0.0, -6.0).with_monetary_distance_rate(-0.0002))
            .with_mode(Pt, ModeParams::new(-0.6, -6.0))
            .with_mode(Ride, ModeParams::new(-1.0, -6.0))
            .with_mode(Freight, ModeParams::new(0.0, -6.0))
            .with_mode(Bicycle, ModeParams::new(-0.5, -12.0))
            .with_mode(Walk, ModeParams::new(0.0, -12.0));
        for aux in [AccessWalk, EgressWalk, TransitWalk, NonNetworkWalk] {
            params = params.with_mode(aux, ModeParams::new(0.0, -12.0));
        }
        params
    }
}
