//! Unit tests for abm-scoring.

use abm_core::time::HOUR_SECS;
use abm_core::{ActivityType, AgentId, TransportMode};
use abm_mobility::Event;
use abm_population::{PriorityMainModeIdentifier, StageActivityTypes};

use crate::{ActivityParams, AgentScorer, ModeParams, ScoringError, ScoringParameters, activity_utility};

const H: f64 = HOUR_SECS;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Builds one agent's event list in order.
struct Day {
    agent: AgentId,
    events: Vec<Event>,
    leg: u32,
}

impl Day {
    fn new(agent: u32) -> Self {
        Self { agent: AgentId(agent), events: Vec::new(), leg: 0 }
    }

    fn end(mut self, time: f64, act: &str) -> Self {
        let act_type = ActivityType::regular(act);
        self.events.push(Event::ActivityEnd { time, agent: self.agent, act_type });
        self
    }

    fn start(mut self, time: f64, act: &str) -> Self {
        let act_type = ActivityType::regular(act);
        self.events.push(Event::ActivityStart { time, agent: self.agent, act_type });
        self
    }

    fn stage(mut self, time: f64, mode: TransportMode) -> Self {
        let act_type = ActivityType::Interaction(mode);
        self.events.push(Event::ActivityStart { time, agent: self.agent, act_type: act_type.clone() });
        self.events.push(Event::ActivityEnd { time, agent: self.agent, act_type });
        self
    }

    fn leg(mut self, departure: f64, mode: TransportMode, travel_time: f64, distance: f64) -> Self {
        let (agent, leg_index) = (self.agent, self.leg);
        let time = departure + travel_time;
        self.events.push(Event::Departure { time: departure, agent, leg_index, mode });
        self.events.push(Event::Teleportation { time, agent, leg_index, mode, distance, travel_time });
        self.events.push(Event::Arrival { time, agent, leg_index, mode });
        self.leg += 1;
        self
    }
}

fn score_with(params: &ScoringParameters, events: &[Event]) -> Result<f64, ScoringError> {
    let stages = StageActivityTypes::default();
    let mut scorer = AgentScorer::new(AgentId(1), params, &stages, &PriorityMainModeIdentifier);
    for e in events {
        scorer.handle_event(e)?;
    }
    scorer.finish()
}

/// home 07:00 → car (with access/egress walks) → work 16:00 → car → home.
///
/// Access and egress: 100 m beeline at 3 km/h (120 s, 130 m).  Main leg:
/// 576 s, 6240 m.
fn car_round_trip() -> Vec<Event> {
    use TransportMode::*;
    Day::new(1)
        .end(7.0 * H, "home")
        .leg(25_200.0, AccessWalk, 120.0, 130.0)
        .stage(25_320.0, Car)
        .leg(25_320.0, Car, 576.0, 6240.0)
        .stage(25_896.0, Car)
        .leg(25_896.0, EgressWalk, 120.0, 130.0)
        .start(26_016.0, "work")
        .end(16.0 * H, "work")
        .leg(57_600.0, AccessWalk, 120.0, 130.0)
        .stage(57_720.0, Car)
        .leg(57_720.0, Car, 576.0, 6240.0)
        .stage(58_296.0, Car)
        .leg(58_296.0, EgressWalk, 120.0, 130.0)
        .start(58_416.0, "home")
        .events
}

// ── Activity and leg terms ────────────────────────────────────────────────────

#[cfg(test)]
mod terms {
    use super::*;
    use crate::leg_utility;

    #[test]
    fn typical_duration_is_worth_ten_hours_of_performing() {
        let params = ScoringParameters::empty();
        for typ_h in [0.5, 1.0, 8.0, 12.0] {
            let act = ActivityParams::new(typ_h * H);
            let u = activity_utility(&params, &act, 0.0, typ_h * H);
            assert!((u - 60.0).abs() < 1e-9, "typical {typ_h} h: {u}");
        }
    }

    #[test]
    fn zero_at_t0_and_linear_below() {
        let params = ScoringParameters::empty();
        let act = ActivityParams::new(8.0 * H);
        let t0 = act.zero_utility_duration();
        assert!(activity_utility(&params, &act, 0.0, t0).abs() < 1e-9);

        let below = activity_utility(&params, &act, 0.0, t0 / 2.0);
        let zero = activity_utility(&params, &act, 0.0, 0.0);
        assert!(below < 0.0);
        assert!((zero - 2.0 * below).abs() < 1e-9, "linear continuation");

        // Slope continuity: the log branch just above t0 matches the line.
        let eps = 1.0;
        let above = activity_utility(&params, &act, 0.0, t0 + eps);
        assert!((above + activity_utility(&params, &act, 0.0, t0 - eps)).abs() < 1e-6);
    }

    #[test]
    fn opening_hours_clip_and_waiting() {
        let mut params = ScoringParameters::empty();
        let act = ActivityParams::new(8.0 * H).with_opening_hours(6.0 * H, 20.0 * H);
        let plain = ActivityParams::new(8.0 * H);

        let clipped = activity_utility(&params, &act, 5.0 * H, 9.0 * H);
        let three_hours = activity_utility(&params, &plain, 0.0, 3.0 * H);
        assert!((clipped - three_hours).abs() < 1e-9);

        let late = activity_utility(&params, &act, 18.0 * H, 22.0 * H);
        assert!((late - activity_utility(&params, &plain, 0.0, 2.0 * H)).abs() < 1e-9);

        params.waiting = -6.0;
        let waited = activity_utility(&params, &act, 5.0 * H, 9.0 * H);
        assert!((waited - (three_hours - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn closed_all_day_is_zero_duration() {
        let params = ScoringParameters::empty();
        let act = ActivityParams::new(1.0 * H).with_opening_hours(8.0 * H, 20.0 * H);
        let u = activity_utility(&params, &act, 21.0 * H, 23.0 * H);
        let zero = activity_utility(&params, &ActivityParams::new(1.0 * H), 0.0, 0.0);
        assert!((u - zero).abs() < 1e-9);
    }

    #[test]
    fn time_window_penalties() {
        let mut params = ScoringParameters::empty();
        params.early_departure = -6.0;
        params.too_short = -3.0;
        let base = ActivityParams::new(8.0 * H);
        let reference = activity_utility(&params, &base, 10.0 * H, 16.0 * H);

        let late = base.clone().with_latest_start(9.0 * H);
        let u = activity_utility(&params, &late, 10.0 * H, 16.0 * H);
        assert!((u - (reference - 18.0)).abs() < 1e-9);

        let early = base.clone().with_earliest_end(17.0 * H);
        let u = activity_utility(&params, &early, 10.0 * H, 16.0 * H);
        assert!((u - (reference - 6.0)).abs() < 1e-9);

        let short = base.with_minimal_duration(8.0 * H);
        let u = activity_utility(&params, &short, 10.0 * H, 16.0 * H);
        assert!((u - (reference - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn leg_terms() {
        let params = ScoringParameters::empty();
        let car = ModeParams::new(0.0, -6.0).with_monetary_distance_rate(-0.0002);
        assert!((leg_utility(&params, &car, 3600.0, 10_000.0) - -8.0).abs() < 1e-12);

        let walk = ModeParams::new(0.0, -12.0).with_marginal_utility_of_distance(-0.001);
        assert!((leg_utility(&params, &walk, 1800.0, 2000.0) - -8.0).abs() < 1e-12);
    }
}

// ── AgentScorer ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod scorer {
    use super::*;

    #[test]
    fn car_round_trip_reference_score() {
        // 2 × (access -0.4, car -0.96 - 1.248, egress -0.4)
        // + work 48·ln(31584 / t0(8 h)) + overnight home 72·ln(53184 / t0(12 h))
        let score = score_with(&ScoringParameters::default(), &car_round_trip()).unwrap();
        assert!((score - 133.383_244_740_010_33).abs() < 1e-9, "{score}");
    }

    #[test]
    fn bit_reproducible() {
        let params = ScoringParameters::default();
        let a = score_with(&params, &car_round_trip()).unwrap();
        let b = score_with(&params, &car_round_trip()).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn trip_constant_once_per_trip() {
        let base = ScoringParameters::default();
        let mut shifted = base.clone();
        shifted.modes.insert(TransportMode::Car, ModeParams {
            constant: -1.5,
            ..base.modes[&TransportMode::Car]
        });
        // Access and egress constants stay untouched; only the main mode counts.
        shifted.modes.insert(TransportMode::AccessWalk, ModeParams {
            constant: -100.0,
            ..base.modes[&TransportMode::AccessWalk]
        });
        let a = score_with(&base, &car_round_trip()).unwrap();
        let b = score_with(&shifted, &car_round_trip()).unwrap();
        assert!((b - a - 2.0 * -1.5).abs() < 1e-9, "{}", b - a);
    }

    #[test]
    fn transit_trip_constant_is_pt() {
        use TransportMode::*;
        let day = Day::new(1)
            .end(8.0 * H, "home")
            .leg(8.0 * H, TransitWalk, 300.0, 400.0)
            .stage(8.0 * H + 300.0, Pt)
            .leg(8.0 * H + 300.0, Pt, 900.0, 6000.0)
            .stage(8.0 * H + 1200.0, Pt)
            .leg(8.0 * H + 1200.0, TransitWalk, 300.0, 400.0)
            .start(8.0 * H + 1500.0, "home")
            .events;
        let base = ScoringParameters::default();
        let mut no_pt_constant = base.clone();
        no_pt_constant.modes.insert(Pt, ModeParams { constant: 0.0, ..base.modes[&Pt] });
        let diff = score_with(&base, &day).unwrap() - score_with(&no_pt_constant, &day).unwrap();
        assert!((diff - -0.6).abs() < 1e-12);
    }

    #[test]
    fn different_first_and_last_types_are_not_wrapped() {
        let params = ScoringParameters::default();
        let day = Day::new(1)
            .end(8.0 * H, "home")
            .leg(8.0 * H, TransportMode::Walk, 600.0, 800.0)
            .start(8.0 * H + 600.0, "leisure")
            .events;
        let score = score_with(&params, &day).unwrap();

        let home = activity_utility(&params, &params.activities["home"], 0.0, 8.0 * H);
        let leisure = activity_utility(&params, &params.activities["leisure"], 8.0 * H + 600.0, 24.0 * H);
        let walk = -12.0 * 600.0 / H;
        assert!((score - (home + leisure + walk)).abs() < 1e-9);
    }

    #[test]
    fn empty_day_scores_zero() {
        assert_eq!(score_with(&ScoringParameters::default(), &[]).unwrap(), 0.0);
    }

    #[test]
    fn stay_home_day_is_scored_over_24_hours() {
        let params = ScoringParameters::default();
        let day = Day::new(1).end(24.0 * H, "home").events;
        let expected = activity_utility(&params, params.activity("home").unwrap(), 0.0, 24.0 * H);
        let score = score_with(&params, &day).unwrap();
        assert!(score > 0.0, "{score}");
        assert!((score - expected).abs() < 1e-12);
    }

    #[test]
    fn arrival_without_departure_rejected() {
        let day = vec![
            Event::ActivityEnd { time: 8.0 * H, agent: AgentId(1), act_type: ActivityType::regular("home") },
            Event::Arrival { time: 8.0 * H + 60.0, agent: AgentId(1), leg_index: 0, mode: TransportMode::Walk },
        ];
        let err = score_with(&ScoringParameters::default(), &day).unwrap_err();
        assert!(matches!(err, ScoringError::UnmatchedArrival { mode: TransportMode::Walk, .. }));
        assert_eq!(err.agent(), Some(AgentId(1)));
    }

    #[test]
    fn arrival_mode_must_match_departure() {
        let mut day = Day::new(1).end(8.0 * H, "home").leg(8.0 * H, TransportMode::Walk, 60.0, 80.0).events;
        if let Some(Event::Arrival { mode, .. }) = day.last_mut() {
            *mode = TransportMode::Bicycle;
        }
        assert!(matches!(
            score_with(&ScoringParameters::default(), &day),
            Err(ScoringError::UnmatchedArrival { mode: TransportMode::Bicycle, .. })
        ));
    }

    #[test]
    fn unknown_activity_is_configuration_error() {
        let day = Day::new(1)
            .end(8.0 * H, "home")
            .leg(8.0 * H, TransportMode::Walk, 60.0, 80.0)
            .start(8.0 * H + 60.0, "gym")
            .end(9.0 * H, "gym")
            .events;
        match score_with(&ScoringParameters::default(), &day) {
            Err(ScoringError::Configuration { agent, what }) => {
                assert_eq!(agent, AgentId(1));
                assert!(what.contains("gym"), "{what}");
            }
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn unknown_mode_is_configuration_error() {
        let params = ScoringParameters::default();
        let mut no_bicycle = params.clone();
        no_bicycle.modes.remove(&TransportMode::Bicycle);
        let day = Day::new(1)
            .end(8.0 * H, "home")
            .leg(8.0 * H, TransportMode::Bicycle, 60.0, 80.0)
            .start(8.0 * H + 60.0, "home")
            .events;
        let err = score_with(&no_bicycle, &day).unwrap_err();
        assert!(matches!(err, ScoringError::Configuration { .. }));
        assert_eq!(err.agent(), Some(AgentId(1)));
    }

    #[test]
    fn out_of_order_events_rejected() {
        let mut day = car_round_trip();
        day.swap(0, 3);
        assert!(matches!(
            score_with(&ScoringParameters::default(), &day),
            Err(ScoringError::Unordered { .. })
        ));
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod params {
    use super::*;

    #[test]
    fn defaults_validate_and_cover_every_mode() {
        let p = ScoringParameters::default();
        p.validate().unwrap();
        for mode in TransportMode::ALL {
            assert!(p.mode(mode).is_some(), "{mode}");
        }
    }

    #[test]
    fn invalid_activity_params_rejected() {
        let zero = ScoringParameters::empty().with_activity("x", ActivityParams::new(0.0));
        assert!(zero.validate().is_err());

        let mut no_priority = ActivityParams::new(H);
        no_priority.priority = 0.0;
        assert!(ScoringParameters::empty().with_activity("x", no_priority).validate().is_err());

        let inverted = ActivityParams::new(H).with_opening_hours(20.0 * H, 8.0 * H);
        assert!(matches!(
            ScoringParameters::empty().with_activity("x", inverted).validate(),
            Err(ScoringError::InvalidParams(_))
        ));
    }
}

// ── ScoringEngine ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine {
    use super::*;
    use abm_core::Coord;
    use abm_mobility::EventsByAgent;
    use abm_population::{Activity, Leg, Person, Plan, Population};

    use crate::ScoringEngine;

    fn person(id: u32) -> Person {
        let home = Activity::new(ActivityType::regular("home"), Coord::default());
        let plan = Plan::new(vec![
            home.clone().with_end_time(7.0 * H).into(),
            Leg::new(TransportMode::Car).into(),
            home.into(),
        ])
        .unwrap();
        Person::new(AgentId(id), plan)
    }

    #[test]
    fn score_all_in_agent_order() {
        let mut p2 = person(2);
        p2.add_and_select(p2.selected_plan().clone());
        let pop = Population::from_persons(vec![p2, person(1), person(3)]).unwrap();

        let mut events = EventsByAgent::new();
        events.insert(AgentId(1), car_round_trip());
        let mut day2 = Day::new(2).end(7.0 * H, "home");
        day2 = day2.leg(7.0 * H, TransportMode::Walk, 60.0, 80.0).start(7.0 * H + 60.0, "home");
        events.insert(AgentId(2), day2.events);

        let engine = ScoringEngine::new(ScoringParameters::default(), StageActivityTypes::default());
        let scored = engine.score_all(&pop, &events).unwrap();

        assert_eq!(scored.iter().map(|s| s.agent).collect::<Vec<_>>(), vec![AgentId(1), AgentId(2), AgentId(3)]);
        assert!((scored[0].score - 133.383_244_740_010_33).abs() < 1e-9);
        assert_eq!(scored[1].plan_index, 1, "scores the selected plan");
        assert_eq!(scored[2].score, 0.0, "no events, no score");
    }

    #[test]
    fn score_all_fails_as_a_whole() {
        let pop = Population::from_persons(vec![person(1), person(2)]).unwrap();
        let mut events = EventsByAgent::new();
        events.insert(AgentId(1), car_round_trip());
        events.insert(AgentId(2), Day::new(2).end(H, "nowhere").leg(H, TransportMode::Walk, 1.0, 1.0).start(H + 1.0, "nowhere").events);
        let engine = ScoringEngine::new(ScoringParameters::default(), StageActivityTypes::default());
        let err = engine.score_all(&pop, &events).unwrap_err();
        assert_eq!(err.agent(), Some(AgentId(2)));
    }
}
