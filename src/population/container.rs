//! The ordered population container.

use super::individual::Individual;

/// Ordered sequence of individuals, and the sole authority for their ids.
///
/// Supports iteration, removal by identity, bulk replacement of members
/// with externally-computed copies ([`update`](Population::update)), and
/// id allocation for children produced during crossover reconciliation.
#[derive(Debug, Clone, Default)]
pub struct Population<S> {
    members: Vec<Individual<S>>,
    next_id: u64,
}

impl<S> Population<S> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            next_id: 0,
        }
    }

    /// Builds a population from existing members; the id counter resumes
    /// past the highest member id.
    pub fn from_members(members: Vec<Individual<S>>) -> Self {
        let next_id = members.iter().map(|i| i.id() + 1).max().unwrap_or(0);
        Self { members, next_id }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual<S>> {
        self.members.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Individual<S>> {
        self.members.iter_mut()
    }

    pub fn as_slice(&self) -> &[Individual<S>] {
        &self.members
    }

    pub fn ids(&self) -> Vec<u64> {
        self.members.iter().map(Individual::id).collect()
    }

    pub fn get(&self, id: u64) -> Option<&Individual<S>> {
        self.members.iter().find(|i| i.id() == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Individual<S>> {
        self.members.iter_mut().find(|i| i.id() == id)
    }

    /// Appends an individual, keeping the id counter ahead of every
    /// member id.
    pub fn push(&mut self, individual: Individual<S>) {
        self.next_id = self.next_id.max(individual.id() + 1);
        self.members.push(individual);
    }

    /// Hands out the next unused id.
    pub fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Removes and returns the individual with `id`, preserving the order
    /// of the remaining members.
    pub fn remove(&mut self, id: u64) -> Option<Individual<S>> {
        let pos = self.members.iter().position(|i| i.id() == id)?;
        Some(self.members.remove(pos))
    }

    /// Replaces members in place with externally-computed copies, matched
    /// by id. Positions are unchanged; copies whose id matches no member
    /// are dropped with a warning (the member may have been evicted while
    /// the copy was in flight).
    pub fn update(&mut self, copies: Vec<Individual<S>>) {
        for copy in copies {
            match self.members.iter().position(|i| i.id() == copy.id()) {
                Some(pos) => self.members[pos] = copy,
                None => log::warn!(
                    "discarding returned copy of individual {}: no longer in population",
                    copy.id()
                ),
            }
        }
    }
}

impl<S> std::ops::Index<usize> for Population<S> {
    type Output = Individual<S>;

    fn index(&self, index: usize) -> &Individual<S> {
        &self.members[index]
    }
}

impl<'a, S> IntoIterator for &'a Population<S> {
    type Item = &'a Individual<S>;
    type IntoIter = std::slice::Iter<'a, Individual<S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
