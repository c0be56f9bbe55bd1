//! Pairwise crossover, sharded across workers.
//!
//! Parents are paired adjacently in population order; one weighted
//! catalogue draw per pair decides whether a crossover happens and which
//! operator runs. Pair processing is partitioned across a fixed worker
//! count and reconciled back into a single ordered children list — for a
//! given engine seed, every worker count produces the identical list.
//!
//! # Key Types
//!
//! - [`CrossoverOperator`]: a pairing operator producing up to two child
//!   structures
//! - [`CrossoverEngine`]: pairing, sharding, and reconciliation

mod engine;
mod types;

pub use engine::CrossoverEngine;
pub use types::CrossoverOperator;
