//! Worker pool and work partitioning.
//!
//! Concurrency in this crate follows one model: a fixed set of cooperating
//! workers, chosen at pool construction and never elastic. A worker is
//! either a peer in a partition-and-merge pass (crossover, relaxation) or
//! a disposable task executor drawing from a shared queue (fitness jobs).
//!
//! - [`WorkerPool`]: an explicitly owned, bounded thread pool. Created at
//!   scheduler construction and released on teardown — no hidden
//!   process-wide pool state. Its `map` is fire-and-collect: inputs move
//!   in by value, outputs come back by value in input order.
//! - [`ShardPlan`]: the explicit partition function
//!   `worker_of(index) = index % workers`, identical on every worker, plus
//!   the single reconciliation primitive [`ShardPlan::merge`] that
//!   rebuilds the canonical sequence from worker-local partial results.

mod shard;
mod worker;

pub use shard::ShardPlan;
pub use worker::WorkerPool;
