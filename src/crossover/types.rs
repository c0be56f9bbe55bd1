//! Crossover operator trait.

use crate::population::Structure;
use rand::Rng;

/// A pairing operator that recombines two parent structures.
///
/// Either child slot may come back `None` when the recombination is
/// infeasible for that slot (e.g. geometrically impossible); `None` slots
/// are dropped during reconciliation, never re-inserted as empty
/// individuals.
///
/// Heterogeneous operator sets go through a user enum implementing this
/// trait and dispatching per variant.
pub trait CrossoverOperator<S: Structure>: Send + Sync {
    /// Short tag recorded in child lineage, e.g. `"Ro"` for a rotation
    /// crossover.
    fn tag(&self) -> &str;

    /// Produces up to two children from two parents.
    fn apply<R: Rng>(&self, parent1: &S, parent2: &S, rng: &mut R) -> (Option<S>, Option<S>);
}
