//! Routing trait and the reference trip router.
//!
//! # Pluggability
//!
//! Replanning and population preparation route trips through the
//! [`LegRouter`] trait, so applications can plug in a network or transit
//! router without touching the loop.  The default [`TripRouter`] needs no
//! network: it routes every mode over the beeline using [`RoutingParams`].
//!
//! # Trip shapes
//!
//! ```text
//! teleported:  ─ walk ─
//! network:     ─ access_walk ─ <mode> interaction ─ <mode> ─ <mode> interaction ─ egress_walk ─
//! ```
//!
//! The interaction activities sit `access_distance` metres from the trip
//! endpoints along the beeline (at most half-way).  `TripRouter` is fully
//! deterministic: equal inputs give equal routes, so there are no ties to
//! break and the `rng` argument is unused.

use abm_core::{AgentId, AgentRng, Coord, TransportMode};
use abm_population::{Activity, Leg, Plan, PlanElement, StageActivityTypes, trips};

use crate::{MobilityError, MobilityResult, ModeRoutingParams, RoutingParams};

// ── LegRouter trait ───────────────────────────────────────────────────────────

/// Pluggable trip router.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so replanning can route agents on
/// Rayon worker threads.
pub trait LegRouter: Send + Sync {
    /// Route one trip with main mode `mode` from `from` to `to`, departing at
    /// `departure` (seconds of day).
    ///
    /// Returns the elements strictly between the two activities: legs with
    /// routes, possibly interleaved with stage activities.
    fn route(
        &self,
        agent:     AgentId,
        mode:      TransportMode,
        from:      &Activity,
        to:        &Activity,
        departure: f64,
        rng:       &mut AgentRng,
    ) -> MobilityResult<Vec<PlanElement>>;
}

// ── TripRouter ────────────────────────────────────────────────────────────────

/// Beeline router for teleported and network modes.
#[derive(Clone, Debug)]
pub struct TripRouter {
    routing: RoutingParams,
}

impl TripRouter {
    pub fn new(routing: RoutingParams) -> Self {
        Self { routing }
    }

    pub fn routing(&self) -> &RoutingParams {
        &self.routing
    }

    fn teleported_leg(
        &self,
        mode:      TransportMode,
        from:      Coord,
        to:        Coord,
        departure: f64,
    ) -> MobilityResult<Leg> {
        let p = self.routing.teleported(mode).ok_or(MobilityError::UnknownMode(mode))?;
        let beeline = from.distance_m(to);
        let mut leg = Leg::new(mode).with_route(beeline / p.speed, beeline * p.beeline_distance_factor);
        leg.departure_time = Some(departure);
        Ok(leg)
    }
}

impl LegRouter for TripRouter {
    fn route(
        &self,
        _agent:    AgentId,
        mode:      TransportMode,
        from:      &Activity,
        to:        &Activity,
        departure: f64,
        _rng:      &mut AgentRng,
    ) -> MobilityResult<Vec<PlanElement>> {
        match *self.routing.get(mode)? {
            ModeRoutingParams::Teleported(_) => {
                Ok(vec![self.teleported_leg(mode, from.coord, to.coord, departure)?.into()])
            }
            ModeRoutingParams::Network(p) => {
                let beeline = from.coord.distance_m(to.coord);
                let offset = p.access_distance.min(beeline / 2.0);
                let access_point = toward(from.coord, to.coord, offset);
                let egress_point = toward(to.coord, from.coord, offset);

                let access = self.teleported_leg(TransportMode::AccessWalk, from.coord, access_point, departure)?;
                let mut now = departure + leg_time(&access);

                let main_beeline = access_point.distance_m(egress_point);
                let mut main = Leg::new(mode)
                    .with_route(main_beeline / p.speed, main_beeline * p.beeline_distance_factor);
                main.departure_time = Some(now);
                now += leg_time(&main);

                let egress = self.teleported_leg(TransportMode::EgressWalk, egress_point, to.coord, now)?;

                Ok(vec![
                    access.into(),
                    Activity::interaction(mode, access_point).into(),
                    main.into(),
                    Activity::interaction(mode, egress_point).into(),
                    egress.into(),
                ])
            }
        }
    }
}

// ── Whole-plan routing ────────────────────────────────────────────────────────

/// Rebuild `plan` with every trip routed again, trip `i` with main mode
/// `trip_modes[i]`.  Activities are kept as they are; departure times follow
/// the activities' end times and the routed travel times.
///
/// # Errors
///
/// `Execution` if `trip_modes` does not have one entry per trip, plus any
/// error of the segmentation or the router.
pub fn route_plan<R: LegRouter + ?Sized>(
    router:     &R,
    agent:      AgentId,
    plan:       &Plan,
    stages:     &StageActivityTypes,
    trip_modes: &[TransportMode],
    rng:        &mut AgentRng,
) -> MobilityResult<Plan> {
    let trips = trips(plan, stages)?;
    if trips.len() != trip_modes.len() {
        return Err(MobilityError::Execution {
            agent,
            reason: format!("{} trip modes for {} trips", trip_modes.len(), trips.len()),
        });
    }
    if trips.is_empty() {
        return Ok(plan.clone());
    }

    let mut elements: Vec<PlanElement> = Vec::with_capacity(plan.len());
    elements.push(trips[0].origin.clone().into());
    let mut now = 0.0;
    for (trip, &mode) in trips.iter().zip(trip_modes) {
        let departure = trip.origin.departure_after(now).unwrap_or(now);
        let routed = router.route(agent, mode, trip.origin, trip.destination, departure, rng)?;
        now = departure + routed.iter().filter_map(PlanElement::as_leg).map(leg_time).sum::<f64>();
        elements.extend(routed);
        elements.push(trip.destination.clone().into());
    }
    Ok(Plan::new(elements)?)
}

/// `true` if some leg of `plan` has no route yet.
pub fn needs_routing(plan: &Plan) -> bool {
    plan.legs().any(|l| l.route.is_none())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

#[inline]
fn leg_time(leg: &Leg) -> f64 {
    leg.route.map_or(0.0, |r| r.travel_time)
}

/// The point `d` metres from `a` in the direction of `b`.
fn toward(a: Coord, b: Coord, d: f64) -> Coord {
    let len = a.distance_m(b);
    if len == 0.0 {
        return a;
    }
    let t = d / len;
    Coord::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}
