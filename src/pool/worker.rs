//! Bounded, explicitly owned worker pool.

use crate::error::Error;
use rayon::prelude::*;
use std::fmt;

/// A bounded pool of worker threads for evaluation jobs.
///
/// Owned by the scheduler that uses it; dropping the scheduler releases
/// the pool. The worker count is fixed at construction, capping concurrent
/// external-process load.
pub struct WorkerPool {
    inner: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Builds a pool with exactly `workers` threads.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for a zero worker count, [`Error::Pool`] if the
    /// underlying thread pool cannot be built.
    pub fn new(workers: usize) -> Result<Self, Error> {
        if workers == 0 {
            return Err(Error::Config("worker pool needs at least one worker".into()));
        }
        let inner = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;
        Ok(Self { inner, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Applies `f` to every input, returning outputs in input order once
    /// all complete (fire-and-collect, no streaming).
    ///
    /// Inputs are moved into the workers and outputs are moved back; no
    /// shared mutable state crosses the worker boundary.
    pub fn map<T, U, F>(&self, inputs: Vec<T>, f: F) -> Vec<U>
    where
        T: Send,
        U: Send,
        F: Fn(T) -> U + Send + Sync,
    {
        self.inner
            .install(|| inputs.into_par_iter().map(f).collect())
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workers_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(Error::Config(_))));
    }

    #[test]
    fn test_map_preserves_input_order() {
        let pool = WorkerPool::new(4).unwrap();
        let inputs: Vec<u64> = (0..100).collect();
        let outputs = pool.map(inputs, |x| x * 2);
        assert_eq!(outputs, (0..100).map(|x| x * 2).collect::<Vec<u64>>());
    }

    #[test]
    fn test_map_empty_inputs() {
        let pool = WorkerPool::new(2).unwrap();
        let outputs: Vec<u64> = pool.map(Vec::<u64>::new(), |x| x);
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_single_worker_pool() {
        let pool = WorkerPool::new(1).unwrap();
        assert_eq!(pool.workers(), 1);
        let outputs = pool.map(vec![3, 1, 2], |x| x + 1);
        assert_eq!(outputs, vec![4, 2, 3]);
    }
}
