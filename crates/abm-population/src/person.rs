//! `Person` - one agent's plan set, selection, and scores.
//!
//! Scores are not stored inside `Plan`.  The scoring engine produces a
//! [`ScoredPlan`] value that names the plan by index; the person folds it into
//! its per-plan score slot.  The plan being simulated and the score being
//! recorded are therefore never the same mutable object.

use abm_core::AgentId;

use crate::{Plan, PopulationError, PopulationResult};

/// The outcome of scoring one executed plan.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScoredPlan {
    pub agent: AgentId,
    /// Index into the person's plan set at the time the plan was executed.
    pub plan_index: usize,
    /// Utility of the experienced day.
    pub score: f64,
}

#[derive(Clone, Debug)]
pub struct Person {
    id: AgentId,
    plans: Vec<Plan>,
    /// Parallel to `plans`; `None` until the plan has been executed once.
    scores: Vec<Option<f64>>,
    selected: usize,
}

impl Person {
    /// A person with a single, selected, unscored plan.
    pub fn new(id: AgentId, plan: Plan) -> Self {
        Self { id, plans: vec![plan], scores: vec![None], selected: 0 }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plan_count(&self) -> usize {
        self.plans.len()
    }

    /// Score of plan `index`, `None` if unscored or out of range.
    pub fn score(&self, index: usize) -> Option<f64> {
        self.scores.get(index).copied().flatten()
    }

    #[inline]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[inline]
    pub fn selected_plan(&self) -> &Plan {
        &self.plans[self.selected]
    }

    #[inline]
    pub fn selected_score(&self) -> Option<f64> {
        self.scores[self.selected]
    }

    /// `(index, score)` of every plan that has a score, in plan order.
    pub fn scored_plans(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.scores
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
    }

    /// Index of the first unscored plan, if any.
    pub fn first_unscored(&self) -> Option<usize> {
        self.scores.iter().position(Option::is_none)
    }

    pub fn select(&mut self, index: usize) -> PopulationResult<()> {
        if index >= self.plans.len() {
            return Err(PopulationError::NoSuchPlan { agent: self.id, index });
        }
        self.selected = index;
        Ok(())
    }

    /// Append `plan` unscored and make it the selected plan.
    pub fn add_and_select(&mut self, plan: Plan) -> usize {
        self.plans.push(plan);
        self.scores.push(None);
        self.selected = self.plans.len() - 1;
        self.selected
    }

    /// Swap plan `index` for `plan`, clearing its score.  Returns the old plan.
    ///
    /// Meant for preparing a population before the first iteration, e.g. to
    /// attach routes; during a run new plans are added instead.
    pub fn replace_plan(&mut self, index: usize, plan: Plan) -> PopulationResult<Plan> {
        let slot = self
            .plans
            .get_mut(index)
            .ok_or(PopulationError::NoSuchPlan { agent: self.id, index })?;
        self.scores[index] = None;
        Ok(std::mem::replace(slot, plan))
    }

    /// Remove a non-selected plan.  Indices above `index` shift down by one.
    pub fn remove_plan(&mut self, index: usize) -> PopulationResult<Plan> {
        if index >= self.plans.len() {
            return Err(PopulationError::NoSuchPlan { agent: self.id, index });
        }
        if index == self.selected {
            return Err(PopulationError::RemoveSelected(self.id));
        }
        self.scores.remove(index);
        if index < self.selected {
            self.selected -= 1;
        }
        Ok(self.plans.remove(index))
    }

    /// Fold an experienced score into the plan's stored score.
    ///
    /// The first score is taken as-is; later ones are blended as
    /// `(1 - rate) * old + rate * new`.  A rate of 1 keeps only the latest.
    pub fn apply_score(&mut self, scored: ScoredPlan, learning_rate: f64) -> PopulationResult<()> {
        let slot = self.scores.get_mut(scored.plan_index).ok_or(PopulationError::NoSuchPlan {
            agent: self.id,
            index: scored.plan_index,
        })?;
        *slot = Some(match *slot {
            None => scored.score,
            Some(_) if learning_rate >= 1.0 => scored.score,
            Some(old) => (1.0 - learning_rate) * old + learning_rate * scored.score,
        });
        Ok(())
    }

    /// Mean over scored plans, `None` if no plan has a score.
    pub fn average_score(&self) -> Option<f64> {
        let (sum, n) = self
            .scored_plans()
            .fold((0.0, 0usize), |(sum, n), (_, s)| (sum + s, n + 1));
        (n > 0).then(|| sum / n as f64)
    }

    pub fn best_score(&self) -> Option<f64> {
        self.scored_plans().map(|(_, s)| s).reduce(f64::max)
    }

    pub fn worst_score(&self) -> Option<f64> {
        self.scored_plans().map(|(_, s)| s).reduce(f64::min)
    }
}
