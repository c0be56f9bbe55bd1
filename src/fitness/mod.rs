//! Fitness scheduling.
//!
//! Dispatches expensive scoring jobs — molecular simulation, diffraction
//! comparison — over the unfitted subset of a population and assigns
//! chi-squared-style scores back by identity. Three dispatch strategies
//! with identical semantics: sequential in-process evaluation, a bounded
//! worker pool, and batched external processes sharing the machine's
//! cores.
//!
//! Evaluation failures (solver exit, timeout, malformed output) never
//! abort a pass; the affected individual receives the sentinel invalid
//! score and the pass completes once every eligible individual has a
//! terminal result.
//!
//! # Key Types
//!
//! - [`ReferenceCurve`]: the fixed measurement a simulated observable is
//!   compared against
//! - [`FitnessScheme`]: one scoring method
//! - [`EvalJob`]: an external-process invocation descriptor
//! - [`FitnessScheduler`]: eligibility, dispatch, result application

mod jobs;
mod scheduler;
mod types;

pub use jobs::{cores_per_job, EvalJob};
pub use scheduler::{Dispatch, FitnessScheduler};
pub use types::{FitnessScheme, ReferenceCurve};
