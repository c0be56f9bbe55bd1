//! Distributed scheduling engine for evolutionary structure optimization.
//!
//! Evolves a population of candidate structures toward minimal disagreement
//! with a target measurement. The structure payload itself is opaque — this
//! crate provides the work-scheduling and reconciliation machinery around it:
//!
//! - **Weighted operator selection**: cumulative-distribution draws over a
//!   catalogue of `(operator, probability)` pairs, shared by crossover and
//!   survivor selection ([`selector`]).
//! - **Crossover engine**: pairwise genetic operations sharded across a
//!   fixed set of workers with deterministic reconciliation of partial
//!   results ([`crossover`]).
//! - **Relaxation scheduling**: successive relaxation modules run over the
//!   unrelaxed subset, with failed individuals evicted ([`relaxation`]).
//! - **Fitness scheduling**: expensive, failure-prone scoring jobs
//!   dispatched sequentially, through a worker pool, or as batched external
//!   processes ([`fitness`]).
//! - **Survivor selection**: weighted choice of a selection strategy
//!   applied to the scored population ([`selection`]).
//! - **Union-find clustering**: equivalence merging over discrete element
//!   sets ([`cluster`]).
//!
//! # Architecture
//!
//! The [`population::Population`] is the single ordered container all
//! schedulers operate over. Workers never mutate it directly: every worker
//! invocation sends an immutable input and receives an immutable output,
//! and the scheduler that owns the pass applies results back by individual
//! id. Partitioning and merging go through one explicit primitive
//! ([`pool::ShardPlan`]), identical on every worker.

pub mod cluster;
pub mod crossover;
pub mod error;
pub mod fitness;
pub mod pool;
pub mod population;
pub mod random;
pub mod relaxation;
pub mod runner;
pub mod selection;
pub mod selector;

pub use error::{Error, EvalError};

/// Sentinel score marking a failed or timed-out evaluation.
///
/// Individuals carrying this value in a relaxation score map are evicted
/// after the relaxation pass; in a fitness score map it marks the scheme
/// as terminally failed for that individual.
pub const INVALID_SCORE: f64 = f64::INFINITY;
