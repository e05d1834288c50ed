//! Core plan types: `Activity`, `Leg`, `PlanElement`, and `Plan`.
//!
//! # Shape invariant
//!
//! A plan is a day: it starts and ends with an activity, and legs never
//! follow each other directly.  `Plan::new` rejects anything else, so every
//! `Plan` value in the framework is well-formed in this sense.  Whether each
//! trip actually contains a leg depends on the configured stage activities and
//! is checked by [`trips`](crate::trips::trips).

use abm_core::{ActivityType, Coord, TransportMode};

use crate::{PopulationError, PopulationResult};

// ── Activity ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activity {
    pub act_type: ActivityType,
    pub coord: Coord,
    /// Planned end time in seconds of day.  `None` for the last activity of
    /// the day and for interaction activities.
    pub end_time: Option<f64>,
    /// Alternative to `end_time`: stay this many seconds after arrival.
    pub max_duration: Option<f64>,
}

impl Activity {
    pub fn new(act_type: ActivityType, coord: Coord) -> Self {
        Self { act_type, coord, end_time: None, max_duration: None }
    }

    /// A zero-duration `"<mode> interaction"` marker at `coord`.
    pub fn interaction(mode: TransportMode, coord: Coord) -> Self {
        Self {
            act_type:     ActivityType::Interaction(mode),
            coord,
            end_time:     None,
            max_duration: Some(0.0),
        }
    }

    pub fn with_end_time(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn with_max_duration(mut self, secs: f64) -> Self {
        self.max_duration = Some(secs);
        self
    }

    /// When the agent leaves, given its arrival time.  The earlier of
    /// `end_time` and `arrival + max_duration` wins; `None` if neither is set.
    pub fn departure_after(&self, arrival: f64) -> Option<f64> {
        let by_duration = self.max_duration.map(|d| arrival + d);
        match (self.end_time, by_duration) {
            (Some(e), Some(d)) => Some(e.min(d).max(arrival)),
            (Some(e), None)    => Some(e.max(arrival)),
            (None, Some(d))    => Some(d),
            (None, None)       => None,
        }
    }
}

// ── Leg ───────────────────────────────────────────────────────────────────────

/// Travel time and distance computed by a router for one leg.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegRoute {
    pub travel_time: f64,
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    pub mode: TransportMode,
    /// Planned departure in seconds of day, if the router set one.
    pub departure_time: Option<f64>,
    /// `None` until routed.
    pub route: Option<LegRoute>,
}

impl Leg {
    pub fn new(mode: TransportMode) -> Self {
        Self { mode, departure_time: None, route: None }
    }

    pub fn with_route(mut self, travel_time: f64, distance: f64) -> Self {
        self.route = Some(LegRoute { travel_time, distance });
        self
    }
}

// ── PlanElement ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanElement {
    Activity(Activity),
    Leg(Leg),
}

impl PlanElement {
    #[inline]
    pub fn as_activity(&self) -> Option<&Activity> {
        match self {
            PlanElement::Activity(a) => Some(a),
            PlanElement::Leg(_) => None,
        }
    }

    #[inline]
    pub fn as_leg(&self) -> Option<&Leg> {
        match self {
            PlanElement::Leg(l) => Some(l),
            PlanElement::Activity(_) => None,
        }
    }

    #[inline]
    pub fn is_leg(&self) -> bool {
        matches!(self, PlanElement::Leg(_))
    }
}

impl From<Activity> for PlanElement {
    fn from(a: Activity) -> Self {
        PlanElement::Activity(a)
    }
}

impl From<Leg> for PlanElement {
    fn from(l: Leg) -> Self {
        PlanElement::Leg(l)
    }
}

// ── Plan ──────────────────────────────────────────────────────────────────────

/// One candidate daily plan.  Immutable once constructed; strategies derive
/// new plans from [`Plan::elements`] and build them again with [`Plan::new`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Plan {
    elements: Vec<PlanElement>,
}

impl Plan {
    /// Validate the shape invariant and wrap `elements`.
    pub fn new(elements: Vec<PlanElement>) -> PopulationResult<Self> {
        match (elements.first(), elements.last()) {
            (Some(PlanElement::Activity(_)), Some(PlanElement::Activity(_))) => {}
            (None, _) => return Err(PopulationError::MalformedPlan("plan is empty".into())),
            _ => {
                return Err(PopulationError::MalformedPlan(
                    "plan must start and end with an activity".into(),
                ));
            }
        }
        if let Some(i) = elements.windows(2).position(|w| w[0].is_leg() && w[1].is_leg()) {
            return Err(PopulationError::MalformedPlan(format!(
                "consecutive legs at elements {i} and {}",
                i + 1
            )));
        }
        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[PlanElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<PlanElement> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn activities(&self) -> impl Iterator<Item = &Activity> + '_ {
        self.elements.iter().filter_map(PlanElement::as_activity)
    }

    pub fn legs(&self) -> impl Iterator<Item = &Leg> + '_ {
        self.elements.iter().filter_map(PlanElement::as_leg)
    }
}
