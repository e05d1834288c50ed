//! The `Population` container.

use rustc_hash::FxHashMap;

use abm_core::AgentId;

use crate::{Person, PopulationError, PopulationResult};

/// All persons of a scenario, kept sorted by `AgentId`.
///
/// Every reduction over the population (statistics, output) walks
/// [`persons`](Self::persons) front to back, so sorted storage is what makes
/// aggregate results independent of insertion order.
#[derive(Clone, Debug, Default)]
pub struct Population {
    persons: Vec<Person>,
    index: FxHashMap<AgentId, usize>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an unordered list, rejecting duplicate ids.
    pub fn from_persons(mut persons: Vec<Person>) -> PopulationResult<Self> {
        persons.sort_by_key(Person::id);
        if let Some(w) = persons.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(PopulationError::DuplicateAgent(w[0].id()));
        }
        let index = persons.iter().enumerate().map(|(i, p)| (p.id(), i)).collect();
        Ok(Self { persons, index })
    }

    /// Insert one person, keeping the storage sorted.
    pub fn insert(&mut self, person: Person) -> PopulationResult<()> {
        if self.index.contains_key(&person.id()) {
            return Err(PopulationError::DuplicateAgent(person.id()));
        }
        let pos = self.persons.partition_point(|p| p.id() < person.id());
        self.persons.insert(pos, person);
        self.reindex();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Person> {
        self.index.get(&id).map(|&i| &self.persons[i])
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Person> {
        self.index.get(&id).map(|&i| &mut self.persons[i])
    }

    /// All persons in ascending `AgentId` order.
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    /// Mutable access in ascending `AgentId` order.  Ids must not be changed
    /// through this slice (`Person` exposes no id setter).
    pub fn persons_mut(&mut self) -> &mut [Person] {
        &mut self.persons
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.persons.iter().map(Person::id)
    }

    fn reindex(&mut self) {
        self.index = self.persons.iter().enumerate().map(|(i, p)| (p.id(), i)).collect();
    }
}
