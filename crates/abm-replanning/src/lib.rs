//! `abm-replanning` - how agents change their plans between iterations.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                           |
//! |---------------|--------------------------------------------------------------------|
//! | [`settings`]  | `Strategy`, `StrategyWeight`, `StrategySettings`                   |
//! | [`scheduler`] | `ReplanningScheduler` - innovation threshold + weighted draw       |
//! | [`selector`]  | `PlanSelector` - ChangeExpBeta, BestScore, KeepLastSelected, …     |
//! | [`module`]    | `PlanStrategyModule` trait, `ReRoute`, `ChangeSingleTripMode`, `TimeAllocationMutator` |
//! | [`memory`]    | `prune_plans` - bounded plan memory                                |
//! | [`replanner`] | `Replanner` - decide per agent, commit later                       |
//! | [`error`]     | `ReplanningError`, `ReplanningResult<T>`                           |
//!
//! # Two-step replanning
//!
//! [`Replanner::decide`] reads a person and returns a [`ReplanDecision`]
//! without touching it.  The control loop collects the decisions of the whole
//! population and only then applies them with [`ReplanDecision::apply`], so a
//! failing agent leaves every plan set unchanged.
//!
//! # Determinism
//!
//! The strategy draw uses the stream `(seed, agent, Replanning{iteration})`;
//! selectors and innovation modules use `(seed, agent, Strategy{iteration})`.
//! Neither depends on the order in which agents are processed.

pub mod error;
pub mod memory;
pub mod module;
pub mod replanner;
pub mod scheduler;
pub mod selector;
pub mod settings;


pub use error::{ReplanningError, ReplanningResult};
pub use memory::prune_plans;
pub use module::{
    ChangeSingleTripMode, InnovationContext, PlanStrategyModule, ReRoute, TimeAllocationMutator,
};
pub use replanner::{ReplanAction, ReplanDecision, Replanner};
pub use scheduler::{Assignment, ReplanningScheduler};
pub use selector::PlanSelector;
pub use settings::{Strategy, StrategySettings, StrategyWeight};
