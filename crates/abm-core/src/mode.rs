//! Transportation mode enum shared across all crates.
//!
//! Modes fall into three groups:
//!
//! - **primary** modes (`pt`, `car`, `freight`, `ride`, `bicycle`) - a trip
//!   containing any of them is attributed to the highest-priority one;
//! - **auxiliary** walks (`access_walk`, `egress_walk`, `transit_walk`,
//!   `non_network_walk`) - glue legs inserted by routers, never a trip's
//!   main mode on their own (except `transit_walk`, see
//!   `abm_population::trips`);
//! - plain `walk`.

use std::str::FromStr;

use crate::CoreError;

/// The means by which an agent travels on one leg.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[non_exhaustive]
pub enum TransportMode {
    /// Private vehicle, driver.
    Car,
    /// Scheduled public transit (bus, rail, ferry…).
    Pt,
    /// Bicycle.
    Bicycle,
    /// On foot, as the main mode of a trip.
    Walk,
    /// Private vehicle, passenger.
    Ride,
    /// Commercial traffic.
    Freight,
    /// Walk from an activity to the main-mode network.
    AccessWalk,
    /// Walk from the main-mode network to an activity.
    EgressWalk,
    /// Walk between transit stops, or a whole pt trip without a vehicle leg.
    TransitWalk,
    /// Walk to or from a teleported mode's start point.
    NonNetworkWalk,
}

impl TransportMode {
    /// Every variant, in declaration order.
    pub const ALL: [TransportMode; 10] = [
        TransportMode::Car,
        TransportMode::Pt,
        TransportMode::Bicycle,
        TransportMode::Walk,
        TransportMode::Ride,
        TransportMode::Freight,
        TransportMode::AccessWalk,
        TransportMode::EgressWalk,
        TransportMode::TransitWalk,
        TransportMode::NonNetworkWalk,
    ];

    /// Rank of a primary mode in main-mode identification (lower wins), or
    /// `None` for walks.
    #[inline]
    pub fn main_mode_priority(self) -> Option<u8> {
        match self {
            TransportMode::Pt      => Some(0),
            TransportMode::Car     => Some(1),
            TransportMode::Freight => Some(2),
            TransportMode::Ride    => Some(3),
            TransportMode::Bicycle => Some(4),
            _ => None,
        }
    }

    /// `true` for router-inserted walks that never define a trip by
    /// themselves.
    #[inline]
    pub fn is_auxiliary_walk(self) -> bool {
        matches!(
            self,
            TransportMode::AccessWalk
                | TransportMode::EgressWalk
                | TransportMode::TransitWalk
                | TransportMode::NonNetworkWalk
        )
    }

    /// Label used in plan files, configuration, and output columns.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Car            => "car",
            TransportMode::Pt             => "pt",
            TransportMode::Bicycle        => "bicycle",
            TransportMode::Walk           => "walk",
            TransportMode::Ride           => "ride",
            TransportMode::Freight        => "freight",
            TransportMode::AccessWalk     => "access_walk",
            TransportMode::EgressWalk     => "egress_walk",
            TransportMode::TransitWalk    => "transit_walk",
            TransportMode::NonNetworkWalk => "non_network_walk",
        }
    }
}

impl FromStr for TransportMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TransportMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CoreError::UnknownMode(s.to_owned()))
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TransportMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TransportMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
