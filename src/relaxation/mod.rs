//! Relaxation scheduling.
//!
//! Drives zero or more relaxation modules, in declared order, over the
//! members that have not been relaxed yet. Execution is a configuration
//! choice — direct in-process calls or a bounded worker pool returning
//! mutated copies — never a correctness concern. A module failure leaves
//! the sentinel invalid score on the individual; after all modules run,
//! sentinel-scored individuals are evicted from the population and every
//! surviving eligible member is flagged relaxed.
//!
//! # Key Types
//!
//! - [`RelaxationModule`]: one relaxation method (e.g. a molecular-dynamics
//!   minimizer or a hard-sphere overlap remover)
//! - [`RelaxationScheduler`]: module ordering, dispatch, eviction
//! - [`RelaxReport`]: what a pass did (relaxed count, evicted ids)

mod scheduler;
mod types;

pub use scheduler::{RelaxReport, RelaxationScheduler};
pub use types::{RelaxMode, RelaxationModule};
