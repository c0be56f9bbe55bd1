//! Reference data and the fitness scheme trait.

use super::jobs::EvalJob;
use crate::error::EvalError;
use crate::population::{Individual, Structure};
use crate::INVALID_SCORE;
use std::fs;
use std::path::Path;

/// A fixed two-column measurement series: independent variable and
/// observed value.
///
/// Loaded once per scheme and immutable for the scheduler's lifetime.
/// The comparison window restricts which points participate in the
/// chi-squared sum — outside the window, simulated and observed values
/// are ignored.
#[derive(Debug, Clone)]
pub struct ReferenceCurve {
    points: Vec<(f64, f64)>,
    window: Option<(f64, f64)>,
}

impl ReferenceCurve {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self {
            points,
            window: None,
        }
    }

    /// Loads a whitespace-separated two-column file. The first line may be
    /// a comment header; `#`-prefixed and blank lines are skipped.
    pub fn from_path(path: &Path) -> Result<Self, EvalError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::new(parse_two_column(&text)?))
    }

    /// Restricts the comparison to points with `x` in `[lo, hi]`.
    pub fn with_window(mut self, lo: f64, hi: f64) -> Self {
        self.window = Some((lo, hi));
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Chi-squared-style disagreement: sum of squared residuals between
    /// the simulated and observed values, paired by index over the
    /// comparison window, divided by the number of compared samples.
    ///
    /// Returns the sentinel invalid score when no samples overlap.
    pub fn chi_squared(&self, simulated: &[(f64, f64)]) -> f64 {
        let n = self.points.len().min(simulated.len());
        let mut sum = 0.0;
        let mut count = 0usize;
        for i in 0..n {
            let (x, observed) = self.points[i];
            if let Some((lo, hi)) = self.window {
                if x < lo || x > hi {
                    continue;
                }
            }
            let residual = simulated[i].1 - observed;
            sum += residual * residual;
            count += 1;
        }
        if count == 0 {
            INVALID_SCORE
        } else {
            sum / count as f64
        }
    }
}

/// Parses whitespace-separated `x y` lines. Extra columns are ignored; a
/// non-numeric first line is treated as a header.
pub(crate) fn parse_two_column(text: &str) -> Result<Vec<(f64, f64)>, EvalError> {
    let mut points = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cols = line.split_whitespace();
        let parsed = match (cols.next(), cols.next()) {
            (Some(x), Some(y)) => x.parse::<f64>().ok().zip(y.parse::<f64>().ok()),
            _ => None,
        };
        match parsed {
            Some(point) => points.push(point),
            None if lineno == 0 => continue, // header line
            None => {
                return Err(EvalError::Malformed(format!(
                    "line {}: expected two numeric columns, got {raw:?}",
                    lineno + 1
                )))
            }
        }
    }
    if points.is_empty() {
        return Err(EvalError::Malformed("no data points".into()));
    }
    Ok(points)
}

/// One fitness scoring method, e.g. a pair-distribution-function
/// comparison or a diffraction fit.
///
/// The scheduler computes the final chi-squared score by comparing the
/// scheme's simulated observable against [`reference`](FitnessScheme::reference),
/// regardless of whether the observable was produced in-process
/// ([`simulate`](FitnessScheme::simulate)) or harvested from an external
/// job ([`job`](FitnessScheme::job)).
pub trait FitnessScheme<S: Structure>: Send + Sync {
    /// Name the score is recorded under, e.g. `"rdf"`.
    fn name(&self) -> &str;

    /// The measurement this scheme compares against.
    fn reference(&self) -> &ReferenceCurve;

    /// Computes the simulated observable in-process.
    fn simulate(&self, individual: &Individual<S>) -> Result<Vec<(f64, f64)>, EvalError>;

    /// Describes the external-process job that would produce the
    /// observable for batched dispatch, given `cores` compute units.
    ///
    /// Returns `None` when the scheme has no external form; batched
    /// dispatch then rejects the scheme at configuration level.
    fn job(&self, _individual: &Individual<S>, _cores: usize) -> Option<Result<EvalJob, EvalError>> {
        None
    }
}
