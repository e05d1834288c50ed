//! Activity types.
//!
//! Activities are either *regular* (`home`, `work`, `leisure`, …), which are
//! scored trip endpoints, or *interactions*: zero-duration markers a router inserts
//! where an agent changes mode, written `"<mode> interaction"` in plan files.
//! Whether an activity bounds a trip is decided by
//! `abm_population::StageActivityTypes`, which by default treats every
//! interaction as a stage.

use std::str::FromStr;

use crate::TransportMode;

/// Suffix that marks an interaction activity in its textual form.
pub const INTERACTION_SUFFIX: &str = " interaction";

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum ActivityType {
    /// An application-defined activity such as `"home"` or `"work"`.
    Regular(String),
    /// A mode-transition marker, e.g. `"car interaction"`.
    Interaction(TransportMode),
}

impl ActivityType {
    /// Convenience constructor for a regular activity.
    pub fn regular(name: impl Into<String>) -> Self {
        ActivityType::Regular(name.into())
    }

    #[inline]
    pub fn is_interaction(&self) -> bool {
        matches!(self, ActivityType::Interaction(_))
    }
}

impl FromStr for ActivityType {
    type Err = std::convert::Infallible;

    /// `"<mode> interaction"` with a known mode parses as an interaction;
    /// everything else is a regular activity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(mode) = s
            .strip_suffix(INTERACTION_SUFFIX)
            .and_then(|m| m.parse::<TransportMode>().ok())
        {
            return Ok(ActivityType::Interaction(mode));
        }
        Ok(ActivityType::Regular(s.to_owned()))
    }
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityType::Regular(name) => f.write_str(name),
            ActivityType::Interaction(mode) => write!(f, "{mode}{INTERACTION_SUFFIX}"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ActivityType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ActivityType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let Ok(act) = s.parse::<ActivityType>();
        Ok(act)
    }
}
