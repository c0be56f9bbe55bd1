//! Relaxation module trait and execution mode.

use crate::error::EvalError;
use crate::population::{Individual, Structure};

/// One relaxation method applied to individuals that have not been
/// relaxed yet.
///
/// A module may mutate the individual's structure (that is the point of
/// relaxing) and returns the relaxation score the scheduler records under
/// [`name`](RelaxationModule::name). Returning an error — or the sentinel
/// score directly — marks the individual for eviction after the pass; the
/// scheduler never lets a module failure abort the batch.
pub trait RelaxationModule<S: Structure>: Send + Sync {
    /// Name the score is recorded under, e.g. `"lammps"`.
    fn name(&self) -> &str;

    /// Relaxes one individual and returns its relaxation score.
    fn relax(&self, individual: &mut Individual<S>) -> Result<f64, EvalError>;
}

/// How eligible individuals are dispatched to the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxMode {
    /// Relax each eligible individual synchronously in-process.
    Direct,
    /// Dispatch copies to a bounded worker pool; returned copies replace
    /// the originals by identity.
    Pool,
}
