//! Choosing among a person's existing plans.
//!
//! | Selector           | Rule                                                             |
//! |--------------------|------------------------------------------------------------------|
//! | `ChangeExpBeta`    | draw another plan; switch with `min(1, 0.01·e^(β·Δ/2))`          |
//! | `BestScore`        | highest score, lowest index on ties                              |
//! | `KeepLastSelected` | keep the current selection                                       |
//! | `SelectRandom`     | uniform over all plans                                           |
//!
//! Every selector first picks an unscored plan if the person has one, so a
//! new plan is always executed once before it competes on score.

use abm_core::AgentRng;
use abm_population::Person;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlanSelector {
    ChangeExpBeta { beta: f64 },
    BestScore,
    KeepLastSelected,
    SelectRandom,
}

impl PlanSelector {
    /// Index of the plan `person` should execute next.
    pub fn select(&self, person: &Person, rng: &mut AgentRng) -> usize {
        if let Some(unscored) = person.first_unscored() {
            return unscored;
        }
        let current = person.selected_index();
        let n = person.plan_count();

        match *self {
            PlanSelector::KeepLastSelected => current,
            PlanSelector::SelectRandom => rng.gen_range(0..n),
            PlanSelector::BestScore => person
                .scored_plans()
                .fold(None, |best: Option<(usize, f64)>, (i, s)| match best {
                    Some((_, b)) if b >= s => best,
                    _ => Some((i, s)),
                })
                .map_or(current, |(i, _)| i),
            PlanSelector::ChangeExpBeta { beta } => {
                if n < 2 {
                    return current;
                }
                // Uniform over the other plans.
                let mut other = rng.gen_range(0..n - 1);
                if other >= current {
                    other += 1;
                }
                let (Some(current_score), Some(other_score)) = (person.score(current), person.score(other))
                else {
                    return current;
                };
                let p = (0.01 * (0.5 * beta * (other_score - current_score)).exp()).min(1.0);
                if rng.gen_bool(p) { other } else { current }
            }
        }
    }
}
