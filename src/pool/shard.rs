//! Index-based work partitioning and reconciliation.

use crate::error::Error;

/// Deterministic assignment of item `index` to a worker.
///
/// Every worker computes the same mapping; there is no leader/follower
/// asymmetry in the logic, only in which partition range each worker
/// processes.
pub fn worker_of(index: usize, workers: usize) -> usize {
    index % workers
}

/// Partition of `items` work indices across a fixed set of workers.
///
/// Worker `w` owns the indices `{ i | i % workers == w }`, in ascending
/// order. [`merge`](ShardPlan::merge) is the reconciliation barrier: it
/// rebuilds one canonical, order-consistent sequence from the worker-local
/// partial results and treats any unfilled or doubly-filled slot as a
/// fatal transport/partition bug.
#[derive(Debug, Clone)]
pub struct ShardPlan {
    assignments: Vec<Vec<usize>>,
    items: usize,
}

impl ShardPlan {
    /// Plans `items` work indices over `workers` workers.
    ///
    /// # Panics
    /// Panics if `workers` is zero.
    pub fn new(items: usize, workers: usize) -> Self {
        assert!(workers > 0, "shard plan needs at least one worker");
        let mut assignments = vec![Vec::new(); workers];
        for index in 0..items {
            assignments[worker_of(index, workers)].push(index);
        }
        Self { assignments, items }
    }

    pub fn workers(&self) -> usize {
        self.assignments.len()
    }

    pub fn items(&self) -> usize {
        self.items
    }

    /// Indices owned by `worker`, in ascending order.
    pub fn indices(&self, worker: usize) -> &[usize] {
        &self.assignments[worker]
    }

    /// Reconciles worker-local results into the canonical item order.
    ///
    /// `parts[w]` must hold one result per index in
    /// [`indices(w)`](ShardPlan::indices), in the same order. Conceptually
    /// every slot starts as a placeholder; each worker overwrites the
    /// slots it owns, and after the exchange every placeholder must have
    /// been overwritten exactly once.
    ///
    /// # Errors
    ///
    /// [`Error::Reconciliation`] on a worker-count or per-worker length
    /// mismatch, a doubly-filled slot, or a slot left unfilled.
    pub fn merge<T>(&self, parts: Vec<Vec<T>>) -> Result<Vec<T>, Error> {
        if parts.len() != self.workers() {
            return Err(Error::Reconciliation(format!(
                "expected results from {} workers, got {}",
                self.workers(),
                parts.len()
            )));
        }

        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(self.items).collect();
        for (worker, part) in parts.into_iter().enumerate() {
            let owned = &self.assignments[worker];
            if part.len() != owned.len() {
                return Err(Error::Reconciliation(format!(
                    "worker {worker} returned {} results for {} owned items",
                    part.len(),
                    owned.len()
                )));
            }
            for (value, &index) in part.into_iter().zip(owned) {
                if slots[index].is_some() {
                    return Err(Error::Reconciliation(format!(
                        "slot {index} filled by more than one worker"
                    )));
                }
                slots[index] = Some(value);
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    Error::Reconciliation(format!("placeholder at slot {index} never overwritten"))
                })
            })
            .collect()
    }
}
