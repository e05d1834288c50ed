//! Bounded plan memory.

use abm_population::{Person, PopulationResult};

/// Remove plans until `person` holds at most `max_plans`.
///
/// Unscored plans go first, then the lowest-scored ones; ties are broken by
/// the lower index.  The selected plan is never removed.  `max_plans == 0`
/// means unbounded.  Returns the number of plans removed.
pub fn prune_plans(person: &mut Person, max_plans: usize) -> PopulationResult<usize> {
    if max_plans == 0 {
        return Ok(0);
    }
    let mut removed = 0;
    while person.plan_count() > max_plans.max(1) {
        let selected = person.selected_index();
        let victim = (0..person.plan_count())
            .filter(|&i| i != selected)
            .min_by(|&a, &b| {
                let key = |i: usize| person.score(i).unwrap_or(f64::NEG_INFINITY);
                key(a).total_cmp(&key(b)).then(a.cmp(&b))
            });
        let Some(victim) = victim else { break };
        person.remove_plan(victim)?;
        removed += 1;
    }
    Ok(removed)
}
