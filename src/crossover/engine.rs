//! Crossover engine: pairing, sharding, reconciliation.

use super::types::CrossoverOperator;
use crate::error::Error;
use crate::pool::{ShardPlan, WorkerPool};
use crate::population::{Individual, Population, Structure};
use crate::random::{create_rng, derive_seed};
use crate::selector::OperatorCatalogue;
use std::marker::PhantomData;

/// Applies catalogue-selected crossovers to adjacent parent pairs.
///
/// Pairing is consecutive and non-overlapping — `(pop[0], pop[1])`,
/// `(pop[2], pop[3])`, … — and an odd trailing member is left unpaired.
/// Each pair draws its operator from an independent RNG stream derived
/// from the engine seed, the pass index, and the pair index: sharded
/// execution across any worker count W ≥ 1 reproduces the unsharded
/// children list exactly, while successive passes on the same engine see
/// fresh draws.
///
/// # Usage
///
/// ```ignore
/// let catalogue = OperatorCatalogue::new(vec![(RotateCrossover, 0.7)])?;
/// let mut engine = CrossoverEngine::new(catalogue, 42)
///     .with_pool(WorkerPool::new(4)?);
/// let children = engine.crossover(&mut population)?;
/// for child in children {
///     population.push(child);
/// }
/// ```
#[derive(Debug)]
pub struct CrossoverEngine<S, O> {
    catalogue: OperatorCatalogue<O>,
    pool: Option<WorkerPool>,
    seed: u64,
    pass: u64,
    _structure: PhantomData<fn() -> S>,
}

impl<S, O> CrossoverEngine<S, O>
where
    S: Structure,
    O: CrossoverOperator<S>,
{
    /// Creates an unsharded engine (one worker, in-process).
    pub fn new(catalogue: OperatorCatalogue<O>, seed: u64) -> Self {
        Self {
            catalogue,
            pool: None,
            seed,
            pass: 0,
            _structure: PhantomData,
        }
    }

    /// Shards pair processing across `pool`'s workers.
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Worker count pair processing is sharded over.
    pub fn workers(&self) -> usize {
        self.pool.as_ref().map_or(1, WorkerPool::workers)
    }

    /// Crossover passes completed so far.
    pub fn pass(&self) -> u64 {
        self.pass
    }

    /// Runs one crossover pass and returns the children (may be empty).
    ///
    /// Children come back with reset evaluation flags, lineage tagged with
    /// both parent ids and the operator tag, and ids freshly assigned by
    /// the population after reconciliation. Each call advances the pass
    /// index, so repeated passes draw independently.
    ///
    /// # Errors
    ///
    /// [`Error::Reconciliation`] or [`Error::ChildCount`] when the merged
    /// results violate the pairing arithmetic — fatal, since it indicates
    /// a transport or partition bug, not a recoverable evaluation failure.
    pub fn crossover(&mut self, population: &mut Population<S>) -> Result<Vec<Individual<S>>, Error> {
        let pass_seed = derive_seed(self.seed, self.pass);
        self.pass += 1;

        let npairs = population.len() / 2;
        if npairs == 0 {
            return Ok(Vec::new());
        }

        let plan = ShardPlan::new(npairs, self.workers());
        let members = population.as_slice();

        // Each worker fills only the pair slots it owns; merge overwrites
        // every placeholder or fails.
        let shard = |indices: Vec<usize>| -> Vec<PairResult<S>> {
            indices
                .into_iter()
                .map(|pair| {
                    self.cross_pair(pass_seed, pair, &members[2 * pair], &members[2 * pair + 1])
                })
                .collect()
        };
        let parts: Vec<Vec<PairResult<S>>> = match &self.pool {
            Some(pool) => {
                let inputs: Vec<Vec<usize>> = (0..plan.workers())
                    .map(|worker| plan.indices(worker).to_vec())
                    .collect();
                pool.map(inputs, shard)
            }
            None => vec![shard((0..npairs).collect())],
        };

        let pair_results = plan.merge(parts)?;

        let dropped = pair_results
            .iter()
            .map(|(a, b)| usize::from(a.is_none()) + usize::from(b.is_none()))
            .sum::<usize>();
        let mut children: Vec<Individual<S>> = pair_results
            .into_iter()
            .flat_map(|(a, b)| [a, b])
            .flatten()
            .collect();

        let expected = 2 * npairs - dropped;
        if children.len() != expected {
            return Err(Error::ChildCount {
                expected,
                actual: children.len(),
            });
        }

        for child in &mut children {
            child.set_id(population.allocate_id());
        }

        log::debug!(
            "crossover pass: {npairs} pairs, {} children, {dropped} dropped slots",
            children.len()
        );
        Ok(children)
    }

    /// Draws an operator for one pair and applies it. A no-op draw yields
    /// two dropped slots.
    fn cross_pair(
        &self,
        pass_seed: u64,
        pair: usize,
        parent1: &Individual<S>,
        parent2: &Individual<S>,
    ) -> PairResult<S> {
        let mut rng = create_rng(derive_seed(pass_seed, pair as u64));
        match self.catalogue.select(&mut rng) {
            None => (None, None),
            Some(operator) => {
                log::debug!(
                    "applying crossover {} to individuals {} and {}",
                    operator.tag(),
                    parent1.id(),
                    parent2.id()
                );
                let (c1, c2) =
                    operator.apply(parent1.structure(), parent2.structure(), &mut rng);
                let lineage =
                    format!("({}+{}){}", parent1.id(), parent2.id(), operator.tag());
                (
                    c1.map(|s| Individual::offspring(s, lineage.clone())),
                    c2.map(|s| Individual::offspring(s, lineage)),
                )
            }
        }
    }
}

type PairResult<S> = (Option<Individual<S>>, Option<Individual<S>>);
