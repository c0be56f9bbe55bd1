//! Weighted operator selection.
//!
//! An [`OperatorCatalogue`] maps operators to probability weights and
//! draws one operator per call by inverse-CDF sampling over the prefix
//! sums of the weights. Crossover catalogues leave probability mass for a
//! synthetic no-op entry (`1 − Σ weights`); survivor-selection catalogues
//! are saturated (weights sum to exactly 1, every draw yields an
//! operator).
//!
//! Each call is an independent draw with no memory of previous draws.
//! Callers that shard work across workers must give each worker its own
//! RNG stream (see [`crate::random`]) — the catalogue itself holds no RNG
//! state.

use crate::error::Error;
use rand::Rng;

const WEIGHT_EPSILON: f64 = 1e-9;

/// A weighted set of operators supporting independent random draws.
///
/// # Examples
///
/// ```
/// use evosched::selector::OperatorCatalogue;
/// use evosched::random::create_rng;
///
/// let catalogue = OperatorCatalogue::new(vec![("rotate", 0.7)]).unwrap();
/// let mut rng = create_rng(42);
/// // ~70% of draws yield Some("rotate"), ~30% yield None (no-op).
/// let _maybe_op = catalogue.select(&mut rng);
/// ```
#[derive(Debug, Clone)]
pub struct OperatorCatalogue<O> {
    /// `None` is the synthetic no-op entry.
    entries: Vec<(Option<O>, f64)>,
    cumulative: Vec<f64>,
}

impl<O> OperatorCatalogue<O> {
    /// Builds a catalogue with a synthetic no-op entry absorbing the
    /// remaining probability mass.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWeights`] if any weight is negative, any weight
    /// exceeds 1, or the weights sum past 1.
    pub fn new(weighted: Vec<(O, f64)>) -> Result<Self, Error> {
        let total = Self::validate(&weighted)?;
        let mut entries: Vec<(Option<O>, f64)> = weighted
            .into_iter()
            .map(|(op, w)| (Some(op), w))
            .collect();
        entries.push((None, (1.0 - total).max(0.0)));
        Ok(Self::from_entries(entries))
    }

    /// Builds a saturated catalogue: weights must sum to exactly 1 and
    /// every draw yields an operator.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWeights`] if any weight is out of range or the sum
    /// differs from 1.
    pub fn saturated(weighted: Vec<(O, f64)>) -> Result<Self, Error> {
        let total = Self::validate(&weighted)?;
        if (total - 1.0).abs() > WEIGHT_EPSILON {
            return Err(Error::InvalidWeights(format!(
                "saturated catalogue weights must sum to 1, got {total}"
            )));
        }
        let entries = weighted
            .into_iter()
            .map(|(op, w)| (Some(op), w))
            .collect();
        Ok(Self::from_entries(entries))
    }

    fn validate(weighted: &[(O, f64)]) -> Result<f64, Error> {
        let mut total = 0.0;
        for (i, (_, w)) in weighted.iter().enumerate() {
            if !w.is_finite() || *w < 0.0 {
                return Err(Error::InvalidWeights(format!(
                    "weight {w} at position {i} is not a probability"
                )));
            }
            total += w;
        }
        if total > 1.0 + WEIGHT_EPSILON {
            return Err(Error::InvalidWeights(format!(
                "weights sum to {total}, which exceeds 1"
            )));
        }
        Ok(total)
    }

    fn from_entries(entries: Vec<(Option<O>, f64)>) -> Self {
        let mut cumulative = Vec::with_capacity(entries.len());
        let mut acc = 0.0;
        for (_, w) in &entries {
            acc += w;
            cumulative.push(acc);
        }
        Self {
            entries,
            cumulative,
        }
    }

    /// Draws one operator; `None` means the no-op entry was selected.
    ///
    /// Draws a uniform value in `[0, total)` and returns the first entry
    /// whose cumulative weight exceeds it (binary search over the prefix
    /// sums).
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&O> {
        let total = *self
            .cumulative
            .last()
            .expect("catalogue always has at least the no-op entry");
        let draw = rng.random_range(0.0..total);
        let idx = self.cumulative.partition_point(|&c| c <= draw);
        let idx = idx.min(self.entries.len() - 1);
        self.entries[idx].0.as_ref()
    }

    /// Number of real (non-no-op) operators.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|(op, _)| op.is_some()).count()
    }

    /// True if the catalogue holds no real operators.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Probability mass assigned to the no-op entry (0 for saturated
    /// catalogues).
    pub fn noop_weight(&self) -> f64 {
        self.entries
            .iter()
            .find(|(op, _)| op.is_none())
            .map_or(0.0, |(_, w)| *w)
    }
}
