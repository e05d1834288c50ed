//! CSV population loader.
//!
//! # CSV format
//!
//! One row per plan element.  Rows of one agent are ordered by `seq`; rows of
//! different agents may be interleaved.  Each agent receives exactly one
//! (selected, unscored) plan.
//!
//! ```csv
//! agent_id,seq,kind,type,x,y,end_time,max_duration,mode,dep_time,travel_time,distance
//! 1,0,act,home,0,0,07:00:00,,,,,
//! 1,1,leg,,,,,,car,,,
//! 1,2,act,work,5000,0,16:00:00,,,,,
//! 1,3,leg,,,,,,car,,,
//! 1,4,act,home,0,0,,,,,,
//! ```
//!
//! | `kind` | required columns          | optional columns                          |
//! |--------|---------------------------|-------------------------------------------|
//! | `act`  | `type`, `x`, `y`          | `end_time`, `max_duration`                |
//! | `leg`  | `mode`                    | `dep_time`, `travel_time` + `distance`    |
//!
//! Times are seconds or `HH:MM[:SS]`.  A leg with both `travel_time` and
//! `distance` is considered routed.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use abm_core::time::parse_time;
use abm_core::{ActivityType, AgentId, Coord, TransportMode};

use crate::{Activity, Leg, Person, Plan, PlanElement, Population, PopulationError};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PlanRecord {
    agent_id:     u32,
    seq:          u32,
    kind:         String,
    #[serde(rename = "type")]
    act_type:     Option<String>,
    x:            Option<f64>,
    y:            Option<f64>,
    end_time:     Option<String>,
    max_duration: Option<String>,
    mode:         Option<String>,
    dep_time:     Option<String>,
    travel_time:  Option<String>,
    distance:     Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a population from a CSV file.
pub fn load_population_csv(path: &Path) -> Result<Population, PopulationError> {
    let file = std::fs::File::open(path).map_err(PopulationError::Io)?;
    load_population_reader(file)
}

/// Like [`load_population_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedding small
/// scenarios as string constants.
pub fn load_population_reader<R: Read>(reader: R) -> Result<Population, PopulationError> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut by_agent: BTreeMap<u32, Vec<PlanRecord>> = BTreeMap::new();

    for result in csv_reader.deserialize::<PlanRecord>() {
        let row = result.map_err(|e| PopulationError::Parse(e.to_string()))?;
        by_agent.entry(row.agent_id).or_default().push(row);
    }

    // ── Build one Person per agent ────────────────────────────────────────
    let mut persons = Vec::with_capacity(by_agent.len());
    for (agent_id, mut rows) in by_agent {
        rows.sort_by_key(|r| r.seq);
        if let Some(w) = rows.windows(2).find(|w| w[0].seq == w[1].seq) {
            return Err(PopulationError::Parse(format!(
                "agent {agent_id}: duplicate seq {}",
                w[0].seq
            )));
        }
        let elements = rows
            .iter()
            .map(|r| parse_element(agent_id, r))
            .collect::<Result<Vec<_>, _>>()?;
        let plan = Plan::new(elements)?;
        persons.push(Person::new(AgentId(agent_id), plan));
    }

    Population::from_persons(persons)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_element(agent_id: u32, r: &PlanRecord) -> Result<PlanElement, PopulationError> {
    let missing = |what: &str| {
        PopulationError::Parse(format!("agent {agent_id}, seq {}: missing {what}", r.seq))
    };
    let opt_time = |v: &Option<String>| -> Result<Option<f64>, PopulationError> {
        match v.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Ok(Some(parse_time(s)?)),
        }
    };

    match r.kind.trim() {
        "act" => {
            let name = r.act_type.as_deref().ok_or_else(|| missing("type"))?;
            let Ok(act_type) = name.parse::<ActivityType>();
            let coord = Coord::new(r.x.ok_or_else(|| missing("x"))?, r.y.ok_or_else(|| missing("y"))?);
            Ok(PlanElement::Activity(Activity {
                act_type,
                coord,
                end_time:     opt_time(&r.end_time)?,
                max_duration: opt_time(&r.max_duration)?,
            }))
        }
        "leg" => {
            let mode: TransportMode = r.mode.as_deref().ok_or_else(|| missing("mode"))?.parse()?;
            let mut leg = Leg::new(mode);
            leg.departure_time = opt_time(&r.dep_time)?;
            if let (Some(tt), Some(dist)) = (opt_time(&r.travel_time)?, r.distance) {
                leg = leg.with_route(tt, dist);
            }
            Ok(PlanElement::Leg(leg))
        }
        other => Err(PopulationError::Parse(format!(
            "agent {agent_id}, seq {}: unknown kind {other:?} (expected \"act\" or \"leg\")",
            r.seq
        ))),
    }
}
