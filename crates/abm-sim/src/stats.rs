//! Per-iteration statistics: score series and mode shares.

use std::collections::BTreeMap;
use std::fmt;

use abm_core::TransportMode;
use abm_population::{MainModeIdentifier, Population, StageActivityTypes, classify_trips};

use crate::{RunError, RunResult};

// ── ScoreItem ─────────────────────────────────────────────────────────────────

/// One of the four score series.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreItem {
    /// Mean score of the plans that were executed (the selected ones).
    Executed,
    /// Mean over persons of the mean score of their scored plans.
    Average,
    /// Mean over persons of their best plan score.
    Best,
    /// Mean over persons of their worst plan score.
    Worst,
}

impl ScoreItem {
    pub const ALL: [ScoreItem; 4] = [ScoreItem::Executed, ScoreItem::Average, ScoreItem::Best, ScoreItem::Worst];

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreItem::Executed => "executed",
            ScoreItem::Average => "average",
            ScoreItem::Best => "best",
            ScoreItem::Worst => "worst",
        }
    }
}

impl fmt::Display for ScoreItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── IterationRecord ───────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IterationRecord {
    pub iteration: u32,
    pub executed: f64,
    pub average: f64,
    pub best: f64,
    pub worst: f64,
}

impl IterationRecord {
    /// Summarise the committed scores of `population`.
    ///
    /// `average` is the mean over persons of each person's mean plan score,
    /// not the mean of the selected plans; that one is `executed`.
    /// Persons without any score do not contribute.  An empty population
    /// yields zeros.
    pub fn compute(iteration: u32, population: &Population) -> Self {
        let persons = population.persons();
        Self {
            iteration,
            executed: mean(persons.iter().filter_map(|p| p.selected_score())),
            average: mean(persons.iter().filter_map(|p| p.average_score())),
            best: mean(persons.iter().filter_map(|p| p.best_score())),
            worst: mean(persons.iter().filter_map(|p| p.worst_score())),
        }
    }

    pub fn get(&self, item: ScoreItem) -> f64 {
        match item {
            ScoreItem::Executed => self.executed,
            ScoreItem::Average => self.average,
            ScoreItem::Best => self.best,
            ScoreItem::Worst => self.worst,
        }
    }
}

/// Sequential sum in iteration order, so the result does not depend on how
/// the scores were computed.
fn mean<I: Iterator<Item = f64>>(values: I) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

// ── ScoreStatsTracker ─────────────────────────────────────────────────────────

/// Append-only history of [`IterationRecord`]s, one per completed iteration.
#[derive(Clone, Debug)]
pub struct ScoreStatsTracker {
    first_iteration: u32,
    history: Vec<IterationRecord>,
}

impl ScoreStatsTracker {
    pub fn new(first_iteration: u32) -> Self {
        Self { first_iteration, history: Vec::new() }
    }

    /// The iteration the next `record` call must be for.
    pub fn next_iteration(&self) -> u32 {
        self.first_iteration + self.history.len() as u32
    }

    /// Compute and append the record of `iteration`.
    ///
    /// # Errors
    ///
    /// `Statistics` unless `iteration` directly follows the last recorded one.
    pub fn record(&mut self, iteration: u32, population: &Population) -> RunResult<IterationRecord> {
        let expected = self.next_iteration();
        if iteration != expected {
            return Err(RunError::Statistics {
                iteration,
                reason: format!("expected a record for iteration {expected}"),
            });
        }
        let record = IterationRecord::compute(iteration, population);
        self.history.push(record);
        Ok(record)
    }

    pub fn get(&self, item: ScoreItem, iteration: u32) -> Option<f64> {
        self.record_of(iteration).map(|r| r.get(item))
    }

    pub fn record_of(&self, iteration: u32) -> Option<&IterationRecord> {
        let offset = iteration.checked_sub(self.first_iteration)?;
        self.history.get(offset as usize)
    }

    /// The whole series of `item`, first iteration first.
    pub fn series(&self, item: ScoreItem) -> Vec<f64> {
        self.history.iter().map(|r| r.get(item)).collect()
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

// ── Mode statistics ───────────────────────────────────────────────────────────

/// Share of trips per main mode among the executed plans of one iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeShares {
    pub iteration: u32,
    pub trips: usize,
    /// Only modes with at least one trip appear; shares sum to 1 when
    /// `trips > 0`.
    pub shares: BTreeMap<TransportMode, f64>,
}

impl ModeShares {
    /// Classify the trips of every selected plan.
    pub fn compute<M: MainModeIdentifier + ?Sized>(
        iteration:  u32,
        population: &Population,
        stages:     &StageActivityTypes,
        identifier: &M,
    ) -> RunResult<Self> {
        let mut counts: BTreeMap<TransportMode, usize> = BTreeMap::new();
        for person in population.persons() {
            let modes = classify_trips(person.selected_plan(), stages, identifier)
                .map_err(|e| RunError::from_population(iteration, Some(person.id()), e))?;
            for mode in modes {
                *counts.entry(mode).or_default() += 1;
            }
        }
        let trips: usize = counts.values().sum();
        let shares = counts
            .into_iter()
            .map(|(mode, n)| (mode, n as f64 / trips as f64))
            .collect();
        Ok(Self { iteration, trips, shares })
    }

    /// Share of `mode`, 0 if no trip used it.
    pub fn share(&self, mode: TransportMode) -> f64 {
        self.shares.get(&mode).copied().unwrap_or(0.0)
    }
}

/// Append-only history of [`ModeShares`].
#[derive(Clone, Debug, Default)]
pub struct ModeStatsTracker {
    history: Vec<ModeShares>,
}

impl ModeStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shares: ModeShares) -> RunResult<()> {
        if let Some(last) = self.history.last() {
            if shares.iteration != last.iteration + 1 {
                return Err(RunError::Statistics {
                    iteration: shares.iteration,
                    reason: format!("mode shares follow iteration {}", last.iteration),
                });
            }
        }
        self.history.push(shares);
        Ok(())
    }

    pub fn get(&self, iteration: u32) -> Option<&ModeShares> {
        self.history.iter().find(|s| s.iteration == iteration)
    }

    pub fn share(&self, mode: TransportMode, iteration: u32) -> Option<f64> {
        self.get(iteration).map(|s| s.share(mode))
    }

    /// Every mode that had a trip in any iteration.
    pub fn modes(&self) -> Vec<TransportMode> {
        let mut modes: Vec<TransportMode> =
            self.history.iter().flat_map(|s| s.shares.keys().copied()).collect();
        modes.sort();
        modes.dedup();
        modes
    }

    pub fn history(&self) -> &[ModeShares] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
