//! Scoring functions and the event-driven per-agent scorer.

use abm_core::time::{DAY_SECS, HOUR_SECS};
use abm_core::{ActivityType, AgentId, TransportMode};
use abm_mobility::Event;
use abm_population::{MainModeIdentifier, StageActivityTypes};

use crate::{ActivityParams, ModeParams, ScoringError, ScoringParameters, ScoringResult};

// ── Pure terms ────────────────────────────────────────────────────────────────

/// Utility of performing an activity from `arrival` to `departure` (s).
///
/// Opening and closing times clip the effective duration.  Time before
/// opening counts as waiting.
pub fn activity_utility(
    params:    &ScoringParameters,
    act:       &ActivityParams,
    arrival:   f64,
    departure: f64,
) -> f64 {
    let mut start = arrival;
    let mut end = departure;
    let mut util = 0.0;

    if let Some(open) = act.opening_time {
        if arrival < open {
            util += params.waiting * (open.min(departure) - arrival).max(0.0) / HOUR_SECS;
        }
        start = start.max(open);
    }
    if let Some(close) = act.closing_time {
        end = end.min(close);
    }
    let duration = (end - start).max(0.0);

    // Performance.
    let typ_h = act.typical_duration / HOUR_SECS;
    let t0 = act.zero_utility_duration();
    if duration >= t0 {
        util += params.marginal_utility_of_performing * typ_h * (duration / t0).ln();
    } else {
        let slope_per_h = params.marginal_utility_of_performing * typ_h / (t0 / HOUR_SECS);
        util += slope_per_h * (duration - t0) / HOUR_SECS;
    }

    if let Some(latest) = act.latest_start_time {
        if start > latest {
            util += params.late_arrival * (start - latest) / HOUR_SECS;
        }
    }
    if let Some(earliest) = act.earliest_end_time {
        if end < earliest {
            util += params.early_departure * (earliest - end) / HOUR_SECS;
        }
    }
    if let Some(minimal) = act.minimal_duration {
        if duration < minimal {
            util += params.too_short * (minimal - duration) / HOUR_SECS;
        }
    }
    util
}

/// Disutility of one leg: time, distance and monetary distance cost.
/// The trip constant is not included.
#[inline]
pub fn leg_utility(params: &ScoringParameters, mode: &ModeParams, travel_time: f64, distance: f64) -> f64 {
    mode.marginal_utility_of_traveling * travel_time / HOUR_SECS
        + (mode.marginal_utility_of_distance
            + params.marginal_utility_of_money * mode.monetary_distance_rate)
            * distance
}

// ── AgentScorer ───────────────────────────────────────────────────────────────

#[derive(Debug)]
struct OpenLeg {
    mode: TransportMode,
    departure: f64,
    distance: f64,
}

/// Consumes one agent's events in time order and accumulates its score.
///
/// Feed every event with [`handle_event`](Self::handle_event), then call
/// [`finish`](Self::finish) to score the overnight activity and obtain the
/// total.  An agent without events scores 0.
pub struct AgentScorer<'a> {
    agent: AgentId,
    params: &'a ScoringParameters,
    stages: &'a StageActivityTypes,
    identifier: &'a dyn MainModeIdentifier,

    score: f64,
    last_time: f64,
    /// Type and end time of the first activity of the day.
    first: Option<(ActivityType, f64)>,
    /// Type and start time of the activity currently performed.
    current: Option<(ActivityType, f64)>,
    leg: Option<OpenLeg>,
    trip_modes: Vec<TransportMode>,
}

impl<'a> AgentScorer<'a> {
    pub fn new(
        agent: AgentId,
        params: &'a ScoringParameters,
        stages: &'a StageActivityTypes,
        identifier: &'a dyn MainModeIdentifier,
    ) -> Self {
        Self {
            agent,
            params,
            stages,
            identifier,
            score: 0.0,
            last_time: f64::NEG_INFINITY,
            first: None,
            current: None,
            leg: None,
            trip_modes: Vec::new(),
        }
    }

    /// Score accumulated so far, without the end-of-day terms.
    pub fn partial_score(&self) -> f64 {
        self.score
    }

    pub fn handle_event(&mut self, event: &Event) -> ScoringResult<()> {
        let time = event.time();
        if time < self.last_time {
            return Err(ScoringError::Unordered { agent: self.agent, time });
        }
        self.last_time = time;

        match event {
            Event::ActivityEnd { act_type, .. } if !self.stages.is_stage(act_type) => {
                match self.current.take() {
                    Some((current, start)) => self.score_activity(&current, start, time)?,
                    None => self.first = Some((act_type.clone(), time)),
                }
                self.trip_modes.clear();
            }
            Event::ActivityStart { act_type, .. } if !self.stages.is_stage(act_type) => {
                self.close_trip()?;
                self.current = Some((act_type.clone(), time));
            }
            Event::ActivityStart { .. } | Event::ActivityEnd { .. } => {}
            Event::Departure { mode, .. } => {
                self.leg = Some(OpenLeg { mode: *mode, departure: time, distance: 0.0 });
            }
            Event::Teleportation { distance, .. } | Event::NetworkTravel { distance, .. } => {
                if let Some(leg) = self.leg.as_mut() {
                    leg.distance += distance;
                }
            }
            Event::Arrival { mode, .. } => {
                let leg = match self.leg.take() {
                    Some(leg) if leg.mode == *mode => leg,
                    _ => return Err(ScoringError::UnmatchedArrival { agent: self.agent, mode: *mode, time }),
                };
                let mode_params = self.mode_params(*mode)?;
                self.score += leg_utility(self.params, mode_params, time - leg.departure, leg.distance);
                self.trip_modes.push(*mode);
            }
        }
        Ok(())
    }

    /// Score the activities left open at the end of the day and return the
    /// total.
    pub fn finish(mut self) -> ScoringResult<f64> {
        match (self.first.take(), self.current.take()) {
            (Some((first, end)), Some((last, start))) if first == last => {
                self.score_activity(&last, start, end + DAY_SECS)?;
            }
            (Some((first, end)), Some((last, start))) => {
                self.score_activity(&first, 0.0, end)?;
                self.score_activity(&last, start, start.max(DAY_SECS))?;
            }
            (Some((first, end)), None) => self.score_activity(&first, 0.0, end)?,
            (None, Some((last, start))) => self.score_activity(&last, start, start.max(DAY_SECS))?,
            (None, None) => {}
        }
        Ok(self.score)
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn close_trip(&mut self) -> ScoringResult<()> {
        if self.trip_modes.is_empty() {
            return Ok(());
        }
        let main = self.identifier.identify(&self.trip_modes)?;
        self.score += self.mode_params(main)?.constant;
        self.trip_modes.clear();
        Ok(())
    }

    fn score_activity(&mut self, act_type: &ActivityType, arrival: f64, departure: f64) -> ScoringResult<()> {
        let act = self.params.activity(&act_type.to_string()).ok_or_else(|| ScoringError::Configuration {
            agent: self.agent,
            what: format!("activity type \"{act_type}\""),
        })?;
        self.score += activity_utility(self.params, act, arrival, departure);
        Ok(())
    }

    fn mode_params(&self, mode: TransportMode) -> ScoringResult<&'a ModeParams> {
        self.params.mode(mode).ok_or_else(|| ScoringError::Configuration {
            agent: self.agent,
            what: format!("mode {mode}"),
        })
    }
}
