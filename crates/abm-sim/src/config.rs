//! Run configuration: one aggregate of every parameter block, loadable from
//! JSON.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use abm_core::ActivityType;
use abm_mobility::RoutingParams;
use abm_population::StageActivityTypes;
use abm_replanning::StrategySettings;
use abm_scoring::ScoringParameters;

use crate::{RunError, RunResult};

// ── ControlerConfig ───────────────────────────────────────────────────────────

/// Iteration range, master seed, and score learning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlerConfig {
    pub first_iteration: u32,
    /// Inclusive.
    pub last_iteration: u32,
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
    /// Weight of the newest experienced score: `new = (1 - lr) * old + lr * experienced`.
    /// Must be in `(0, 1]`; 1 keeps only the latest score.
    pub score_learning_rate: f64,
}

impl Default for ControlerConfig {
    fn default() -> Self {
        Self { first_iteration: 0, last_iteration: 10, seed: 4711, score_learning_rate: 1.0 }
    }
}

impl ControlerConfig {
    /// Number of iterations the run executes.
    pub fn iteration_count(&self) -> u32 {
        self.last_iteration.saturating_sub(self.first_iteration) + 1
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

/// Everything a run needs apart from the population.
///
/// Missing sections fall back to their defaults, so `{}` is a valid file.
///
/// ```json
/// {
///   "controler": { "last_iteration": 20, "seed": 1 },
///   "strategy": { "fraction_of_iterations_to_disable_innovation": 0.8 },
///   "stage_activities": ["car interaction", "pt interaction"]
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub controler: ControlerConfig,
    pub strategy: StrategySettings,
    pub routing: RoutingParams,
    pub scoring: ScoringParameters,
    /// Activity types treated as trip stages.  `None` treats every
    /// `<mode> interaction` as a stage.
    pub stage_activities: Option<Vec<ActivityType>>,
}

impl Config {
    pub fn from_json_reader<R: Read>(reader: R) -> RunResult<Self> {
        serde_json::from_reader(reader).map_err(|e| RunError::Config(format!("invalid JSON config: {e}")))
    }

    pub fn from_json_file(path: &Path) -> RunResult<Self> {
        let file = File::open(path)
            .map_err(|e| RunError::Config(format!("cannot open {}: {e}", path.display())))?;
        Self::from_json_reader(BufReader::new(file))
    }

    pub fn to_json_string(&self) -> RunResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RunError::Config(e.to_string()))
    }

    /// The stage predicate described by `stage_activities`.
    pub fn stage_activity_types(&self) -> StageActivityTypes {
        match &self.stage_activities {
            None => StageActivityTypes::AllInteractions,
            Some(types) => StageActivityTypes::from_types(types.iter().cloned()),
        }
    }

    /// Check every parameter block.  The first problem found is reported.
    pub fn validate(&self) -> RunResult<()> {
        let c = &self.controler;
        if c.first_iteration > c.last_iteration {
            return Err(RunError::Config(format!(
                "first_iteration {} is after last_iteration {}",
                c.first_iteration, c.last_iteration
            )));
        }
        if !(c.score_learning_rate > 0.0 && c.score_learning_rate <= 1.0) {
            return Err(RunError::Config(format!(
                "score_learning_rate must be in (0, 1], got {}",
                c.score_learning_rate
            )));
        }
        self.strategy.validate().map_err(|e| RunError::Config(e.to_string()))?;
        self.routing.validate().map_err(|e| RunError::Config(e.to_string()))?;
        self.scoring.validate().map_err(|e| RunError::Config(e.to_string()))?;
        if let Some(types) = &self.stage_activities {
            if let Some(t) = types.iter().find(|t| !t.is_interaction()) {
                log::warn!("stage activity list contains the regular type \"{t}\"; it will never bound a trip");
            }
        }
        Ok(())
    }
}
