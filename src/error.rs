//! Error taxonomy for the scheduling engine.
//!
//! Two tiers, matching how failures propagate:
//!
//! - [`Error`]: contract violations and capacity/configuration errors.
//!   Fatal to the scheduling pass, signaled immediately, never retried.
//! - [`EvalError`]: external evaluation failures (solver exit, timeout,
//!   malformed output). Recoverable at the population level — schedulers
//!   absorb these into the per-individual sentinel score
//!   ([`crate::INVALID_SCORE`]) and the pass continues.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal scheduling errors: logic, transport, or configuration defects.
#[derive(Debug, Error)]
pub enum Error {
    /// An equivalence pair referenced an element outside the declared
    /// universe.
    #[error("equivalence pair references unknown element {0}")]
    UnknownElement(String),

    /// Worker-local partial results could not be merged back into one
    /// canonical sequence. Indicates a partition or transport bug.
    #[error("reconciliation failed: {0}")]
    Reconciliation(String),

    /// Child count after crossover reconciliation did not match the
    /// pairing arithmetic.
    #[error("child count mismatch after reconciliation: expected {expected}, got {actual}")]
    ChildCount { expected: usize, actual: usize },

    /// Operator weights were negative or summed past 1.
    #[error("invalid operator weights: {0}")]
    InvalidWeights(String),

    /// Batched dispatch was configured to need more cores per job than the
    /// machine offers. Raised before any job launches.
    #[error("batched dispatch needs at least {required} cores per job but only {available} are available")]
    InsufficientCores { required: usize, available: usize },

    /// A scheduler was constructed with inconsistent parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The worker pool could not be built.
    #[error("worker pool construction failed: {0}")]
    Pool(String),
}

/// Recoverable per-individual evaluation failures.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The external solver exited with a non-zero status.
    #[error("solver exited with status {status}")]
    Solver { status: i32 },

    /// The result was not available within the job's wait budget.
    #[error("evaluation exceeded its wait budget of {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    /// The solver finished but its expected output file is absent.
    #[error("solver produced no output at {path}")]
    MissingOutput { path: PathBuf },

    /// The output file exists but could not be parsed.
    #[error("malformed solver output: {0}")]
    Malformed(String),

    /// I/O failure while launching the job or reading its results.
    #[error("i/o failure during evaluation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InsufficientCores {
            required: 8,
            available: 4,
        };
        assert_eq!(
            err.to_string(),
            "batched dispatch needs at least 8 cores per job but only 4 are available"
        );
    }

    #[test]
    fn test_eval_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EvalError = io.into();
        assert!(matches!(err, EvalError::Io(_)));
    }

    #[test]
    fn test_child_count_display() {
        let err = Error::ChildCount {
            expected: 6,
            actual: 5,
        };
        assert!(err.to_string().contains("expected 6"));
        assert!(err.to_string().contains("got 5"));
    }
}
