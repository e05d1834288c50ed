//! Unit and scenario tests for abm-sim.

use abm_core::{ActivityType, AgentId, AgentRng, Coord, StrategyId, TransportMode};
use abm_mobility::{TeleportationDiagnostics, TeleportedModeParams};
use abm_population::{Activity, Leg, Person, Plan, Population};
use abm_replanning::{
    InnovationContext, PlanStrategyModule, ReplanningError, ReplanningResult, Strategy,
    StrategySettings, StrategyWeight,
};

use crate::{
    Config, ControlerBuilder, ControlerListener, EventHandlerListener, IterationSummary,
    NoopListener, RunError, ScoreItem, ScoreStatsTracker,
};

const H: f64 = 3600.0;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn act(kind: &str, x: f64, y: f64) -> Activity {
    Activity::new(ActivityType::regular(kind), Coord::new(x, y))
}

/// home → `mode` → `kind` → `mode` → home, legs unrouted.
fn round_trip(mode: TransportMode, kind: &str, x: f64, y: f64, leave: f64, back: f64) -> Plan {
    Plan::new(vec![
        act("home", 0.0, 0.0).with_end_time(leave).into(),
        Leg::new(mode).into(),
        act(kind, x, y).with_end_time(back).into(),
        Leg::new(mode).into(),
        act("home", 0.0, 0.0).into(),
    ])
    .unwrap()
}

fn population(persons: Vec<(u32, Plan)>) -> Population {
    Population::from_persons(persons.into_iter().map(|(id, p)| Person::new(AgentId(id), p)).collect())
        .unwrap()
}

/// Twenty agents over four modes and three activity types.
fn mixed_population() -> Population {
    let modes = [TransportMode::Car, TransportMode::Walk, TransportMode::Bicycle, TransportMode::Pt];
    let kinds = ["work", "shop", "leisure"];
    population(
        (0..20u32)
            .map(|i| {
                let mode = modes[i as usize % modes.len()];
                let kind = kinds[i as usize % kinds.len()];
                let d = 800.0 + 450.0 * f64::from(i);
                let leave = 6.5 * H + 600.0 * f64::from(i % 6);
                let back = leave + 8.0 * H;
                (100 + i, round_trip(mode, kind, d, 0.5 * d, leave, back))
            })
            .collect(),
    )
}

fn config(last_iteration: u32) -> Config {
    let mut config = Config::default();
    config.controler.last_iteration = last_iteration;
    config.controler.seed = 17;
    config
}

/// Records what the loop reports.
#[derive(Default)]
struct Recorder {
    started: bool,
    iterations: Vec<u32>,
    innovated: Vec<(u32, usize)>,
    plan_totals: Vec<usize>,
    share_sums: Vec<f64>,
    shutdown: Option<u32>,
}

impl ControlerListener for Recorder {
    fn on_startup(&mut self, _config: &Config, population: &Population) {
        self.started = true;
        assert!(population.persons().iter().all(|p| p.selected_score().is_none()));
    }

    fn on_replanning(&mut self, iteration: u32, innovated: usize, _selected: usize) {
        self.innovated.push((iteration, innovated));
    }

    fn on_iteration_end(&mut self, summary: &IterationSummary<'_>) {
        self.iterations.push(summary.iteration);
        self.plan_totals.push(summary.population.persons().iter().map(Person::plan_count).sum());
        self.share_sums.push(summary.modes.shares.values().sum());
    }

    fn on_shutdown(&mut self, last_iteration: u32, _population: &Population) {
        self.shutdown = Some(last_iteration);
    }
}

struct Failing;

impl PlanStrategyModule for Failing {
    fn name(&self) -> &str {
        "Failing"
    }

    fn innovate(&self, _: &InnovationContext<'_>, person: &Person, _: &mut AgentRng) -> ReplanningResult<Plan> {
        Err(ReplanningError::Innovation { agent: person.id(), reason: "no alternative".into() })
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod configuration {
    use super::*;

    #[test]
    fn empty_json_is_the_default() {
        let config = Config::from_json_reader("{}".as_bytes()).unwrap();
        assert_eq!(config, Config::default());
        config.validate().unwrap();
    }

    #[test]
    fn partial_json_overrides_sections() {
        let json = r#"{
            "controler": { "last_iteration": 3, "seed": 9, "score_learning_rate": 0.5 },
            "strategy": {
                "strategies": [ { "strategy": "best_score", "weight": 1.0 } ],
                "fraction_of_iterations_to_disable_innovation": 1.0
            },
            "stage_activities": [ "car interaction" ]
        }"#;
        let config = Config::from_json_reader(json.as_bytes()).unwrap();
        assert_eq!(config.controler.last_iteration, 3);
        assert_eq!(config.controler.first_iteration, 0);
        assert_eq!(config.controler.seed, 9);
        assert_eq!(config.controler.score_learning_rate, 0.5);
        assert_eq!(config.strategy.strategies, vec![StrategyWeight::new(Strategy::BestScore, 1.0)]);
        assert_eq!(config.strategy.max_agent_plan_memory_size, 5, "unset fields keep defaults");
        assert_eq!(config.stage_activities, Some(vec![ActivityType::Interaction(TransportMode::Car)]));

        let stages = config.stage_activity_types();
        assert!(stages.is_stage(&ActivityType::Interaction(TransportMode::Car)));
        assert!(!stages.is_stage(&ActivityType::Interaction(TransportMode::Pt)));
        config.validate().unwrap();
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = config(7);
        config.strategy = StrategySettings::selection_only(Strategy::SelectRandom);
        std::fs::write(&path, config.to_json_string().unwrap()).unwrap();

        assert_eq!(Config::from_json_file(&path).unwrap(), config);
        assert!(matches!(
            Config::from_json_file(&dir.path().join("missing.json")),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = Config::from_json_reader(r#"{ "controler": { "seed": "x" } }"#.as_bytes()).unwrap_err();
        assert!(matches!(err, RunError::Config(_)), "{err}");
    }

    #[test]
    fn out_of_range_values_rejected() {
        let mut c = Config::default();
        c.controler.first_iteration = 5;
        c.controler.last_iteration = 4;
        assert!(matches!(c.validate(), Err(RunError::Config(_))));

        let mut c = Config::default();
        c.controler.score_learning_rate = 0.0;
        assert!(c.validate().is_err());

        let mut c = Config::default();
        c.strategy.fraction_of_iterations_to_disable_innovation = 1.5;
        assert!(c.validate().is_err());

        let mut c = Config::default();
        c.strategy.strategies.clear();
        assert!(c.validate().is_err());

        let mut c = Config::default();
        c.routing = c.routing.with_teleported(TransportMode::Walk, TeleportedModeParams::new(0.0, 1.3));
        assert!(c.validate().is_err());

        let mut c = Config::default();
        c.routing = c.routing.with_teleported(TransportMode::Walk, TeleportedModeParams::new(1.0, 0.9));
        assert!(c.validate().is_err(), "beeline factor below 1");
    }

    #[test]
    fn build_validates() {
        let mut c = config(3);
        c.controler.score_learning_rate = 2.0;
        let err = ControlerBuilder::new(c, mixed_population()).build().err().unwrap();
        assert!(matches!(err, RunError::Config(_)));
    }
}

// ── Score statistics ──────────────────────────────────────────────────────────

#[cfg(test)]
mod stats {
    use super::*;

    #[test]
    fn record_appends_in_order() {
        let mut pop = population(vec![(1, round_trip(TransportMode::Walk, "work", 500.0, 0.0, 7.0 * H, 15.0 * H))]);
        let mut tracker = ScoreStatsTracker::new(2);
        assert!(tracker.is_empty());

        pop.persons_mut()[0]
            .apply_score(abm_population::ScoredPlan { agent: AgentId(1), plan_index: 0, score: 10.0 }, 1.0)
            .unwrap();
        let r = tracker.record(2, &pop).unwrap();
        assert_eq!((r.executed, r.average, r.best, r.worst), (10.0, 10.0, 10.0, 10.0));

        assert!(matches!(tracker.record(4, &pop), Err(RunError::Statistics { iteration: 4, .. })));
        tracker.record(3, &pop).unwrap();

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.get(ScoreItem::Executed, 3), Some(10.0));
        assert_eq!(tracker.get(ScoreItem::Executed, 1), None);
        assert_eq!(tracker.get(ScoreItem::Executed, 4), None);
        assert_eq!(tracker.series(ScoreItem::Worst), vec![10.0, 10.0]);
    }

    #[test]
    fn four_series_over_plan_sets() {
        use abm_population::ScoredPlan;

        let plan = round_trip(TransportMode::Walk, "work", 500.0, 0.0, 7.0 * H, 15.0 * H);
        let mut a = Person::new(AgentId(1), plan.clone());
        a.apply_score(ScoredPlan { agent: AgentId(1), plan_index: 0, score: 10.0 }, 1.0).unwrap();
        a.add_and_select(plan.clone());
        a.apply_score(ScoredPlan { agent: AgentId(1), plan_index: 1, score: 20.0 }, 1.0).unwrap();
        let mut b = Person::new(AgentId(2), plan.clone());
        b.apply_score(ScoredPlan { agent: AgentId(2), plan_index: 0, score: 40.0 }, 1.0).unwrap();
        // Unscored persons do not count.
        let c = Person::new(AgentId(3), plan);

        let pop = Population::from_persons(vec![a, b, c]).unwrap();
        let r = ScoreStatsTracker::new(0).record(0, &pop).unwrap();
        assert_eq!(r.executed, 30.0);
        assert_eq!(r.average, 27.5);
        assert_eq!(r.best, 30.0);
        assert_eq!(r.worst, 25.0);
        assert_eq!(r.get(ScoreItem::Average), 27.5);
    }

    #[test]
    fn empty_population_scores_zero() {
        let r = ScoreStatsTracker::new(0).record(0, &Population::new()).unwrap();
        assert_eq!(r.executed, 0.0);
        assert_eq!(r.average, 0.0);
    }
}

// ── Full runs ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use super::*;

    #[test]
    fn single_car_agent_reference_score() {
        let pop = population(vec![(1, round_trip(TransportMode::Car, "work", 5000.0, 0.0, 7.0 * H, 16.0 * H))]);
        let mut controler = ControlerBuilder::new(config(0), pop).build().unwrap();
        controler.run(&mut NoopListener).unwrap();

        let executed = controler.score_stats().get(ScoreItem::Executed, 0).unwrap();
        assert!((executed - 133.383_244_740_010_3).abs() < 1e-6, "{executed}");

        let person = controler.population().get(AgentId(1)).unwrap();
        assert_eq!(person.selected_score(), Some(executed));
        // access walk, car, egress walk per trip
        assert_eq!(person.selected_plan().legs().count(), 6);
        assert_eq!(controler.mode_stats().share(TransportMode::Car, 0), Some(1.0));
    }

    #[test]
    fn executed_equals_average_in_first_iteration() {
        let mut c = config(4);
        c.routing = c
            .routing
            .with_teleported(TransportMode::Bicycle, TeleportedModeParams::new(11.3 / 3.6, 1.3).with_randomization(0.3));
        let mut controler = ControlerBuilder::new(c, mixed_population()).build().unwrap();
        controler.run(&mut NoopListener).unwrap();

        let stats = controler.score_stats();
        assert_eq!(stats.len(), 5);
        let first = stats.record_of(0).unwrap();
        assert_eq!(first.executed, first.average);
        assert_eq!(first.best, first.worst);

        // Randomised bicycle travel changes scores from iteration 1 on.
        let average = stats.series(ScoreItem::Average);
        assert!(average[1..].iter().any(|&a| a != average[0]), "{average:?}");
        for r in stats.history() {
            assert!(r.worst <= r.average + 1e-9 && r.average <= r.best + 1e-9, "{r:?}");
        }
    }

    #[test]
    fn selection_only_second_iteration_moves_average() {
        let mut c = config(1);
        c.strategy.fraction_of_iterations_to_disable_innovation = 1.0;
        c.routing = c
            .routing
            .with_teleported(TransportMode::Bicycle, TeleportedModeParams::new(11.3 / 3.6, 1.3).with_randomization(0.3));
        let mut recorder = Recorder::default();
        let mut controler = ControlerBuilder::new(c, mixed_population()).build().unwrap();
        controler.run(&mut recorder).unwrap();

        assert_eq!(recorder.innovated, vec![(1, 0)]);
        let stats = controler.score_stats();
        let (first, second) = (stats.record_of(0).unwrap(), stats.record_of(1).unwrap());
        assert_eq!(first.executed, first.average);
        assert_ne!(second.average, first.average);
        assert!(controler.population().persons().iter().all(|p| p.plan_count() == 1));
    }

    #[test]
    fn stay_home_agent_scores_a_full_day_at_home() {
        let pop = population(vec![(1, Plan::new(vec![act("home", 0.0, 0.0).into()]).unwrap())]);
        let c = config(0);
        let home = c.scoring.activity("home").unwrap();
        let expected = abm_scoring::activity_utility(&c.scoring, home, 0.0, 24.0 * H);
        let mut controler = ControlerBuilder::new(c.clone(), pop).build().unwrap();
        controler.run(&mut NoopListener).unwrap();

        let executed = controler.score_stats().get(ScoreItem::Executed, 0).unwrap();
        assert!(executed > 0.0, "{executed}");
        assert!((executed - expected).abs() < 1e-12, "{executed} vs {expected}");
        assert_eq!(controler.mode_stats().get(0).unwrap().trips, 0);
    }

    #[test]
    fn mode_shares_sum_to_one_every_iteration() {
        let mut recorder = Recorder::default();
        let mut controler = ControlerBuilder::new(config(6), mixed_population()).build().unwrap();
        controler.run(&mut recorder).unwrap();

        assert_eq!(recorder.share_sums.len(), 7);
        for sum in &recorder.share_sums {
            assert!((sum - 1.0).abs() < 1e-12, "{sum}");
        }
        let shares = controler.mode_stats().get(0).unwrap();
        assert_eq!(shares.trips, 40);
        for mode in [TransportMode::Car, TransportMode::Walk, TransportMode::Bicycle, TransportMode::Pt] {
            assert!((shares.share(mode) - 0.25).abs() < 1e-12, "{mode}");
        }
    }

    #[test]
    fn history_covers_every_iteration() {
        let mut c = config(5);
        c.controler.first_iteration = 3;
        let mut recorder = Recorder::default();
        let mut controler = ControlerBuilder::new(c, mixed_population()).build().unwrap();
        controler.run(&mut recorder).unwrap();

        assert!(recorder.started);
        assert_eq!(recorder.iterations, vec![3, 4, 5]);
        assert_eq!(recorder.innovated.iter().map(|&(it, _)| it).collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(recorder.shutdown, Some(5));
        assert_eq!(controler.completed_iteration(), Some(5));
        assert_eq!(controler.score_stats().len(), 3);
        assert_eq!(controler.score_stats().get(ScoreItem::Executed, 2), None);
        assert!(controler.score_stats().get(ScoreItem::Executed, 3).is_some());
        assert_eq!(controler.mode_stats().len(), 3);
    }

    #[test]
    fn no_innovation_after_threshold() {
        let mut c = config(10);
        c.strategy.fraction_of_iterations_to_disable_innovation = 0.5;
        c.strategy.strategies = vec![
            StrategyWeight::new(Strategy::BestScore, 0.5),
            StrategyWeight::new(Strategy::TimeAllocationMutator, 0.5),
        ];
        c.strategy.max_agent_plan_memory_size = 0;
        let mut recorder = Recorder::default();
        let mut controler = ControlerBuilder::new(c, mixed_population()).build().unwrap();
        controler.run(&mut recorder).unwrap();

        let before: usize = recorder.innovated.iter().filter(|&&(it, _)| it <= 5).map(|&(_, n)| n).sum();
        assert!(before > 0, "half of twenty agents innovate while allowed");
        for &(it, n) in &recorder.innovated {
            if it > 5 {
                assert_eq!(n, 0, "iteration {it}");
            }
        }
        // Plan sets stop growing once innovation is off.
        let after = &recorder.plan_totals[5..];
        assert!(after.iter().all(|&n| n == after[0]), "{:?}", recorder.plan_totals);
    }

    #[test]
    fn plan_memory_is_bounded() {
        let mut c = config(8);
        c.strategy.strategies = vec![
            StrategyWeight::new(Strategy::ChangeExpBeta, 0.2),
            StrategyWeight::new(Strategy::ChangeSingleTripMode, 0.8),
        ];
        c.strategy.fraction_of_iterations_to_disable_innovation = 0.0;
        c.strategy.max_agent_plan_memory_size = 3;
        let mut controler = ControlerBuilder::new(c, mixed_population()).build().unwrap();
        controler.run(&mut NoopListener).unwrap();

        for person in controler.population().persons() {
            assert!(person.plan_count() <= 3, "{}", person.id());
            assert!(person.selected_score().is_some());
        }
    }

    #[test]
    fn same_seed_same_run() {
        let series = |seed: u64| {
            let mut c = config(6);
            c.controler.seed = seed;
            let mut controler = ControlerBuilder::new(c, mixed_population()).build().unwrap();
            controler.run(&mut NoopListener).unwrap();
            let pop = controler.population();
            let selected: Vec<usize> = pop.persons().iter().map(|p| p.selected_index()).collect();
            (controler.score_stats().history().to_vec(), selected)
        };
        assert_eq!(series(3), series(3));
    }

    #[test]
    fn teleported_speeds_recovered_from_events() {
        let pop = population(vec![
            (1, round_trip(TransportMode::Walk, "shop", 700.0, 300.0, 9.0 * H, 10.0 * H)),
            (2, round_trip(TransportMode::Bicycle, "work", 4000.0, 0.0, 7.0 * H, 15.0 * H)),
        ]);
        let mut c = config(1);
        c.strategy = StrategySettings::selection_only(Strategy::KeepLastSelected);
        let mut listener = EventHandlerListener::new(TeleportationDiagnostics::new());
        let mut controler = ControlerBuilder::new(c.clone(), pop).build().unwrap();
        controler.run(&mut listener).unwrap();

        let diagnostics = listener.into_inner();
        for (agent, mode) in [(AgentId(1), TransportMode::Walk), (AgentId(2), TransportMode::Bicycle)] {
            let params = c.routing.teleported(mode).unwrap();
            let legs = diagnostics.legs(agent);
            assert_eq!(legs.len(), 2);
            for leg in legs {
                let speed = leg.distance / params.beeline_distance_factor / leg.travel_time;
                assert!((speed - params.speed).abs() < 0.01, "{agent} {speed}");
            }
        }
    }

    #[test]
    fn controler_runs_once() {
        let mut controler = ControlerBuilder::new(config(0), mixed_population()).build().unwrap();
        controler.run(&mut NoopListener).unwrap();
        assert!(matches!(controler.run(&mut NoopListener), Err(RunError::Config(_))));
    }
}

// ── Failure handling ──────────────────────────────────────────────────────────

#[cfg(test)]
mod failures {
    use super::*;

    #[test]
    fn unknown_activity_aborts_before_any_score_is_committed() {
        let pop = population(vec![
            (1, round_trip(TransportMode::Walk, "work", 500.0, 0.0, 7.0 * H, 15.0 * H)),
            (2, round_trip(TransportMode::Walk, "nowhere", 500.0, 0.0, 7.0 * H, 15.0 * H)),
            (3, round_trip(TransportMode::Walk, "work", 500.0, 0.0, 7.0 * H, 15.0 * H)),
        ]);
        let mut controler = ControlerBuilder::new(config(2), pop).build().unwrap();
        let err = controler.run(&mut NoopListener).unwrap_err();

        match &err {
            RunError::ScoringConfiguration { iteration, agent, what } => {
                assert_eq!(*iteration, 0);
                assert_eq!(*agent, AgentId(2));
                assert!(what.contains("nowhere"), "{what}");
            }
            other => panic!("expected ScoringConfiguration, got {other:?}"),
        }
        assert_eq!(err.iteration(), Some(0));
        assert_eq!(err.agent(), Some(AgentId(2)));
        assert!(controler.population().persons().iter().all(|p| p.selected_score().is_none()));
        assert!(controler.score_stats().is_empty());
        assert_eq!(controler.completed_iteration(), None);
    }

    #[test]
    fn failing_module_aborts_without_touching_plans() {
        let mut c = config(3);
        c.strategy.strategies = vec![
            StrategyWeight::new(Strategy::KeepLastSelected, 1e-12),
            StrategyWeight::new(Strategy::ReRoute, 1.0),
        ];
        c.strategy.fraction_of_iterations_to_disable_innovation = 0.0;
        let mut controler = ControlerBuilder::new(c, mixed_population())
            .strategy_module(StrategyId(1), Box::new(Failing))
            .build()
            .unwrap();
        let err = controler.run(&mut NoopListener).unwrap_err();

        assert!(matches!(err, RunError::Replanning { iteration: 1, .. }), "{err}");
        assert_eq!(err.agent(), Some(AgentId(100)), "first agent in id order");
        assert_eq!(controler.completed_iteration(), Some(0));
        assert_eq!(controler.score_stats().len(), 1);
        assert!(controler.population().persons().iter().all(|p| p.plan_count() == 1));
    }

    #[test]
    fn unknown_strategy_module_slot_is_a_config_error() {
        let err = ControlerBuilder::new(config(1), mixed_population())
            .strategy_module(StrategyId(40), Box::new(Failing))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn missing_end_time_is_an_execution_error() {
        let plan = Plan::new(vec![
            act("home", 0.0, 0.0).into(),
            Leg::new(TransportMode::Walk).into(),
            act("work", 500.0, 0.0).into(),
        ])
        .unwrap();
        let mut controler = ControlerBuilder::new(config(0), population(vec![(5, plan)])).build().unwrap();
        let err = controler.run(&mut NoopListener).unwrap_err();
        assert!(matches!(err, RunError::SimulationExecution { iteration: 0, agent: Some(AgentId(5)), .. }), "{err}");
    }
}
