//! Population container and individual metadata.
//!
//! The [`Population`] is the ordered sequence of [`Individual`]s all
//! schedulers operate over. Order matters only for deterministic pairing
//! (adjacent crossover pairs) and deterministic index-based partitioning
//! across workers.
//!
//! Ownership discipline: the population exclusively owns its individuals.
//! Workers receive *copies* for off-process evaluation and the scheduler
//! that owns the pass is the sole authority that reconciles results back
//! by identity ([`Population::update`]).
//!
//! # Key Types
//!
//! - [`Structure`]: the opaque candidate-structure payload
//! - [`Individual`]: payload plus scheduling metadata (flags, scores,
//!   lineage)
//! - [`Population`]: the ordered container with remove/update/id-allocation

mod container;
mod individual;

pub use container::Population;
pub use individual::{Individual, Structure};
