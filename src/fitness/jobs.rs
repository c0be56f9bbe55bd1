//! External evaluation jobs: launch, bounded-wait harvest, core budgeting.

use super::types::parse_two_column;
use crate::error::{Error, EvalError};
use std::fs;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(300);
const DEFAULT_WAIT_BUDGET: Duration = Duration::from_secs(300);

/// An external-process invocation that produces a two-column result file.
///
/// Lifecycle: create → [`launch`](EvalJob::launch) →
/// [`harvest`](EvalJob::harvest) → result applied to the owning
/// individual → descriptor discarded.
#[derive(Debug, Clone)]
pub struct EvalJob {
    /// Identifying key: the owning individual's id.
    pub key: u64,
    pub program: String,
    pub args: Vec<String>,
    /// Compute units granted to this job.
    pub cores: usize,
    /// Well-known path the solver writes its results to.
    pub output: PathBuf,
    /// Bounded wait budget; exceeding it is a timeout failure distinct
    /// from a solver-reported failure.
    pub wait_budget: Duration,
}

impl EvalJob {
    pub fn new(key: u64, program: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            key,
            program: program.into(),
            args: Vec::new(),
            cores: 1,
            output: output.into(),
            wait_budget: DEFAULT_WAIT_BUDGET,
        }
    }

    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.cores = cores;
        self
    }

    pub fn with_wait_budget(mut self, budget: Duration) -> Self {
        self.wait_budget = budget;
        self
    }

    /// Spawns the solver process.
    pub fn launch(&self) -> Result<Child, EvalError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        Ok(child)
    }

    /// Waits for the process within the wait budget and parses its result
    /// file into the simulated curve.
    ///
    /// # Errors
    ///
    /// - [`EvalError::Timeout`]: budget exceeded (the child is killed)
    /// - [`EvalError::Solver`]: non-zero exit status
    /// - [`EvalError::MissingOutput`] / [`EvalError::Malformed`]: result
    ///   file absent or unreadable
    pub fn harvest(&self, child: &mut Child) -> Result<Vec<(f64, f64)>, EvalError> {
        let deadline = Instant::now() + self.wait_budget;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EvalError::Timeout {
                    budget_ms: self.wait_budget.as_millis() as u64,
                });
            }
            thread::sleep(POLL_INTERVAL.min(self.wait_budget));
        };

        if !status.success() {
            return Err(EvalError::Solver {
                status: status.code().unwrap_or(-1),
            });
        }
        if !self.output.exists() {
            return Err(EvalError::MissingOutput {
                path: self.output.clone(),
            });
        }
        let text = fs::read_to_string(&self.output)?;
        parse_two_column(&text)
    }

    /// Launch and harvest in one step (sequential dispatch).
    pub fn run(&self) -> Result<Vec<(f64, f64)>, EvalError> {
        let mut child = self.launch()?;
        self.harvest(&mut child)
    }
}

/// Splits `available` compute units over `jobs` concurrent jobs.
///
/// The per-job share is the floor of the even split (minimum 1), clamped
/// to the configured `[min, max]` range.
///
/// # Errors
///
/// [`Error::Config`] for an inconsistent range, and
/// [`Error::InsufficientCores`] when `min` exceeds what the machine
/// offers — a capacity error surfaced before any job launches.
pub fn cores_per_job(
    available: usize,
    jobs: usize,
    min: usize,
    max: usize,
) -> Result<usize, Error> {
    if min == 0 || max < min {
        return Err(Error::Config(format!(
            "cores-per-job range [{min}, {max}] is not a valid range"
        )));
    }
    if min > available {
        return Err(Error::InsufficientCores {
            required: min,
            available,
        });
    }
    let share = if jobs == 0 { available } else { available / jobs };
    Ok(share.max(1).clamp(min, max))
}
