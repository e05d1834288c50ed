//! `abm-mobility` - plan execution: events, teleportation, routing.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`event`]       | `Event`, `EventsByAgent`, `EventHandler`, `dispatch`            |
//! | [`params`]      | `TeleportedModeParams`, `NetworkModeParams`, `RoutingParams`    |
//! | [`teleport`]    | `TeleportationModel` - beeline → distance and travel time       |
//! | [`router`]      | `LegRouter` trait, reference `TripRouter`                       |
//! | [`mobsim`]      | `Mobsim` trait, reference `TeleportationMobsim`                 |
//! | [`diagnostics`] | `TeleportationDiagnostics` event handler                        |
//! | [`error`]       | `MobilityError`, `MobilityResult<T>`                            |
//!
//! # Execution model
//!
//! A mobsim turns every agent's selected plan into a time-ordered list of
//! [`Event`]s for one simulated day.  Legs of *teleported* modes are not
//! simulated on a network: the [`TeleportationModel`] derives distance and
//! travel time from the beeline between the surrounding activities.  Legs of
//! *network* modes are executed with the travel time and distance stored in
//! their route, which the [`LegRouter`] filled in beforehand.
//!
//! Each agent's day is computed independently from `(seed, agent, iteration,
//! leg)` keyed random streams, so the output does not depend on agent order
//! or thread count.
//!
//! # Feature flags
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Executes agents on Rayon's thread pool.                  |
//! | `serde`    | Derives `Serialize`/`Deserialize` for the parameter types. |

pub mod diagnostics;
pub mod error;
pub mod event;
pub mod mobsim;
pub mod params;
pub mod router;
pub mod teleport;


pub use diagnostics::{TeleportationDiagnostics, TeleportedLeg};
pub use error::{MobilityError, MobilityResult};
pub use event::{Event, EventHandler, EventsByAgent, dispatch};
pub use mobsim::{Mobsim, TeleportationMobsim};
pub use params::{ModeRoutingParams, NetworkModeParams, RoutingParams, TeleportedModeParams};
pub use router::{LegRouter, TripRouter, needs_routing, route_plan};
pub use teleport::{TeleportationModel, TeleportedTravel};
