//! `abm-scoring` - utility of an experienced day.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`params`]   | `ScoringParameters`, `ActivityParams`, `ModeParams`           |
//! | [`function`] | `activity_utility`, `leg_utility`, event-driven `AgentScorer` |
//! | [`engine`]   | `ScoringEngine` - one `ScoredPlan` per agent                  |
//! | [`error`]    | `ScoringError`, `ScoringResult<T>`                            |
//!
//! # Utility model
//!
//! The score of a day is the sum of
//!
//! | Term              | Value                                                           |
//! |-------------------|-----------------------------------------------------------------|
//! | activity          | `β_perf · t_typ · ln(dur / t0)`, linear below `t0`              |
//! | late arrival      | `β_late · hours after latest start time`                        |
//! | early departure   | `β_early · hours before earliest end time`                      |
//! | too short         | `β_short · hours below minimal duration`                        |
//! | waiting           | `β_wait · hours spent before opening time`                      |
//! | leg               | `β_trav(mode) · hours + (β_dist(mode) + γ_money · rate(mode)) · m` |
//! | trip              | `constant(main mode)`, once per trip                            |
//!
//! where `t0 = t_typ · exp(-10 / (t_typ[h] / priority))`.  Stage activities
//! are not scored.  When the first and the last activity of the day have the
//! same type they are scored as one overnight activity.

pub mod engine;
pub mod error;
pub mod function;
pub mod params;

#[cfg(test)]
mod tests;

pub use engine::ScoringEngine;
pub use error::{ScoringError, ScoringResult};
pub use function::{AgentScorer, activity_utility, leg_utility};
pub use params::{ActivityParams, ModeParams, ScoringParameters};
