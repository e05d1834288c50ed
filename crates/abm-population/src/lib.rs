//! `abm-population` - plans, persons, trip structure, and population loading.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`plan`]       | `Activity`, `Leg`, `LegRoute`, `PlanElement`, `Plan`         |
//! | [`person`]     | `Person` (plan set + selection + scores), `ScoredPlan`       |
//! | [`population`] | `Population` (sorted by `AgentId`)                           |
//! | [`trips`]      | `StageActivityTypes`, `Trip`, `trips`, `MainModeIdentifier`  |
//! | [`loader`]     | `load_population_csv`, `load_population_reader`              |
//! | [`error`]      | `PopulationError`, `PopulationResult<T>`                     |

pub mod error;
pub mod loader;
pub mod person;
pub mod plan;
pub mod population;
pub mod trips;


pub use error::{PopulationError, PopulationResult};
pub use loader::{load_population_csv, load_population_reader};
pub use person::{Person, ScoredPlan};
pub use plan::{Activity, Leg, LegRoute, Plan, PlanElement};
pub use population::Population;
pub use trips::{
    MainModeIdentifier, PriorityMainModeIdentifier, StageActivityTypes, Trip, classify_trips,
    trips,
};
