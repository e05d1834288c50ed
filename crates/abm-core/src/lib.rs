//! `abm-core` - foundational types for the `rust_abm` demand-simulation
//! framework.
//!
//! This crate is a dependency of every other `abm-*` crate.  It has no
//! `abm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `AgentId`, `StrategyId`                                 |
//! | [`geo`]       | `Coord`, beeline distance                               |
//! | [`time`]      | seconds-of-day helpers, `HH:MM:SS` parsing/formatting   |
//! | [`rng`]       | `AgentRng` keyed per (seed, agent, stream)              |
//! | [`mode`]      | `TransportMode` enum                                    |
//! | [`activity`]  | `ActivityType` (regular vs. stage/interaction)          |
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod activity;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use activity::ActivityType;
pub use error::{CoreError, CoreResult};
pub use geo::Coord;
pub use ids::{AgentId, StrategyId};
pub use mode::TransportMode;
pub use rng::{AgentRng, RngStream};
