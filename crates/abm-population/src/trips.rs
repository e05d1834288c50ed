//! Trip segmentation and main-mode identification.
//!
//! # Segmentation
//!
//! A plan is cut at every activity that is *not* a stage activity.  The
//! elements strictly between two such boundaries form one [`Trip`]: one or
//! more legs, possibly interleaved with stage activities (`"pt interaction"`
//! and the like).  A boundary pair with no leg between them is a malformed
//! plan.
//!
//! ```text
//! home ─ access_walk ─ car interaction ─ car ─ car interaction ─ egress_walk ─ work ─ walk ─ home
//! └──────────────────────────── trip 0 (car) ──────────────────────────────────┘└── trip 1 (walk)┘
//! ```
//!
//! # Main mode
//!
//! [`PriorityMainModeIdentifier`] applies a fixed order, so the answer never
//! depends on which leg happens to come first:
//!
//! 1. any primary mode present → the highest-priority one
//!    (`pt > car > freight > ride > bicycle`);
//! 2. exactly one distinct non-auxiliary mode present → that mode;
//! 3. only `transit_walk` legs → `pt` (a transit trip on foot);
//! 4. otherwise → `walk`.

use std::collections::BTreeSet;

use abm_core::{ActivityType, TransportMode};

use crate::{Activity, Leg, Plan, PlanElement, PopulationError, PopulationResult};

// ── StageActivityTypes ────────────────────────────────────────────────────────

/// Predicate deciding which activity types are stage markers rather than
/// trip endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum StageActivityTypes {
    /// Every `ActivityType::Interaction(_)` is a stage.
    #[default]
    AllInteractions,
    /// Exactly the listed types are stages.
    Explicit(BTreeSet<ActivityType>),
}

impl StageActivityTypes {
    pub fn from_types<I: IntoIterator<Item = ActivityType>>(types: I) -> Self {
        StageActivityTypes::Explicit(types.into_iter().collect())
    }

    /// `true` if `act_type` never bounds a trip.
    #[inline]
    pub fn is_stage(&self, act_type: &ActivityType) -> bool {
        match self {
            StageActivityTypes::AllInteractions => act_type.is_interaction(),
            StageActivityTypes::Explicit(set) => set.contains(act_type),
        }
    }
}

// ── Trip ──────────────────────────────────────────────────────────────────────

/// A borrowed view of one trip inside a plan.
#[derive(Clone, Copy, Debug)]
pub struct Trip<'a> {
    pub origin: &'a Activity,
    pub destination: &'a Activity,
    /// Element index of `origin` in the plan.
    pub origin_index: usize,
    /// Element index of `destination` in the plan.
    pub destination_index: usize,
    /// Elements strictly between origin and destination.
    pub elements: &'a [PlanElement],
}

impl<'a> Trip<'a> {
    pub fn legs(&self) -> impl Iterator<Item = &'a Leg> + 'a {
        self.elements.iter().filter_map(PlanElement::as_leg)
    }

    pub fn leg_modes(&self) -> Vec<TransportMode> {
        self.legs().map(|l| l.mode).collect()
    }
}

/// Split `plan` into trips.
///
/// # Errors
///
/// `MalformedPlan` if the plan starts or ends with a stage activity, or if
/// two consecutive trip boundaries enclose no leg.
pub fn trips<'a>(plan: &'a Plan, stages: &StageActivityTypes) -> PopulationResult<Vec<Trip<'a>>> {
    let elements = plan.elements();
    let boundaries: Vec<(usize, &Activity)> = elements
        .iter()
        .enumerate()
        .filter_map(|(i, e)| {
            e.as_activity()
                .filter(|a| !stages.is_stage(&a.act_type))
                .map(|a| (i, a))
        })
        .collect();

    let last = elements.len().saturating_sub(1);
    if boundaries.first().map(|b| b.0) != Some(0) || boundaries.last().map(|b| b.0) != Some(last) {
        return Err(PopulationError::MalformedPlan(
            "plan must start and end with a non-stage activity".into(),
        ));
    }

    boundaries
        .windows(2)
        .map(|w| {
            let (o, origin) = w[0];
            let (d, destination) = w[1];
            let inner = &elements[o + 1..d];
            if !inner.iter().any(PlanElement::is_leg) {
                return Err(PopulationError::MalformedPlan(format!(
                    "no leg between activities at elements {o} and {d}"
                )));
            }
            Ok(Trip {
                origin,
                destination,
                origin_index:      o,
                destination_index: d,
                elements:          inner,
            })
        })
        .collect()
}

// ── Main-mode identification ──────────────────────────────────────────────────

/// Reduces the leg modes of one trip to a single representative mode.
pub trait MainModeIdentifier: Send + Sync {
    /// # Errors
    ///
    /// `MalformedPlan` if `leg_modes` is empty.
    fn identify(&self, leg_modes: &[TransportMode]) -> PopulationResult<TransportMode>;
}

/// The fixed-priority identifier described in the module docs.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityMainModeIdentifier;

impl MainModeIdentifier for PriorityMainModeIdentifier {
    fn identify(&self, leg_modes: &[TransportMode]) -> PopulationResult<TransportMode> {
        if leg_modes.is_empty() {
            return Err(PopulationError::MalformedPlan("trip without legs".into()));
        }

        if let Some((_, mode)) = leg_modes
            .iter()
            .filter_map(|&m| m.main_mode_priority().map(|p| (p, m)))
            .min()
        {
            return Ok(mode);
        }

        let non_auxiliary: BTreeSet<TransportMode> =
            leg_modes.iter().copied().filter(|m| !m.is_auxiliary_walk()).collect();
        if non_auxiliary.len() == 1 {
            if let Some(&mode) = non_auxiliary.first() {
                return Ok(mode);
            }
        }

        if leg_modes.iter().all(|&m| m == TransportMode::TransitWalk) {
            return Ok(TransportMode::Pt);
        }
        Ok(TransportMode::Walk)
    }
}

/// Main mode of every trip of `plan`, in trip order.
pub fn classify_trips<M: MainModeIdentifier + ?Sized>(
    plan: &Plan,
    stages: &StageActivityTypes,
    identifier: &M,
) -> PopulationResult<Vec<TransportMode>> {
    trips(plan, stages)?
        .iter()
        .map(|t| identifier.identify(&t.leg_modes()))
        .collect()
}
