//! `abm-sim` - the iterative control loop of the rust_abm framework.
//!
//! # Iteration structure
//!
//! ```text
//! prepare:  route every plan that still has unrouted legs
//! for k in first_iteration..=last_iteration:
//!   ⓪ Replanning  - only for k > first: decide for every agent, then apply
//!                   (parallel with the `parallel` feature).
//!   ① Mobsim      - execute each selected plan → events per agent.
//!   ② Scoring     - score each agent's events → ScoredPlan, then commit
//!                   with the score learning rate.
//!   ③ Statistics  - executed / average / best / worst score, mode shares.
//!   ④ Listeners   - ControlerListener::on_iteration_end.
//! ```
//!
//! Replanning belonging to the end of iteration k-1 runs at the head of
//! iteration k.  Iteration `first` therefore executes and scores the initial
//! plans only, and its executed and average scores coincide.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`config`]     | `Config`, `ControlerConfig`, JSON loading and validation   |
//! | [`builder`]    | `ControlerBuilder` - plug in custom mobsim, router, …      |
//! | [`controler`]  | `Controler` - the loop itself                              |
//! | [`stats`]      | `ScoreStatsTracker`, `ModeStatsTracker`                    |
//! | [`observer`]   | `ControlerListener`, `NoopListener`, `EventHandlerListener`|
//! | [`error`]      | `RunError`, `RunResult<T>`                                 |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Per-agent phases run on Rayon's thread pool.               |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use abm_population::load_population_csv;
//! use abm_sim::{Config, ControlerBuilder, NoopListener};
//!
//! let config = Config::from_json_file("config.json".as_ref())?;
//! let population = load_population_csv("plans.csv".as_ref())?;
//! let mut controler = ControlerBuilder::new(config, population).build()?;
//! controler.run(&mut NoopListener)?;
//! println!("{:?}", controler.score_stats().last());
//! ```

pub mod builder;
pub mod config;
pub mod controler;
pub mod error;
pub mod observer;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::ControlerBuilder;
pub use config::{Config, ControlerConfig};
pub use controler::Controler;
pub use error::{RunError, RunResult};
pub use observer::{ControlerListener, EventHandlerListener, IterationSummary, NoopListener};
pub use stats::{IterationRecord, ModeShares, ModeStatsTracker, ScoreItem, ScoreStatsTracker};
