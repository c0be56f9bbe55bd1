//! Survivor selection.
//!
//! After scoring, the population is cut back to its target size. A
//! [`SurvivorSelector`] holds a saturated catalogue of selection
//! strategies (weights sum to 1, every draw yields a strategy) and draws
//! one strategy per pass. All strategies assume **minimization** (lower
//! score = better).

use crate::error::Error;
use crate::population::{Population, Structure};
use crate::selector::OperatorCatalogue;
use crate::INVALID_SCORE;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One survivor-selection strategy.
///
/// `select` returns the ids to keep; it never mutates the population.
/// Returned ids must be a subset of the population's ids, at most `nkeep`
/// of them.
pub trait SelectionOperator<S: Structure>: Send + Sync {
    fn name(&self) -> &str;

    fn select(
        &self,
        population: &Population<S>,
        scores: &BTreeMap<u64, f64>,
        nkeep: usize,
    ) -> Vec<u64>;
}

/// Keeps the `nkeep` lowest-score individuals.
///
/// Ids without a score entry rank as the sentinel invalid score, so
/// unscored members are cut before any scored one. Equal scores break
/// ties by id, which keeps the result deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostSelection;

impl<S: Structure> SelectionOperator<S> for CostSelection {
    fn name(&self) -> &str {
        "cost"
    }

    fn select(
        &self,
        population: &Population<S>,
        scores: &BTreeMap<u64, f64>,
        nkeep: usize,
    ) -> Vec<u64> {
        let mut ranked: Vec<(f64, u64)> = population
            .iter()
            .map(|ind| {
                let score = scores.get(&ind.id()).copied().unwrap_or(INVALID_SCORE);
                (score, ind.id())
            })
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        ranked.truncate(nkeep);
        ranked.into_iter().map(|(_, id)| id).collect()
    }
}

/// Cuts a population down to `nkeep` members using one strategy drawn
/// per pass from a saturated catalogue.
pub struct SurvivorSelector<S: Structure> {
    catalogue: OperatorCatalogue<Arc<dyn SelectionOperator<S>>>,
}

impl<S: Structure> SurvivorSelector<S> {
    /// Builds a selector over weighted strategies.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWeights`] unless the weights sum to exactly 1;
    /// survivor selection has no no-op, some strategy must run.
    pub fn new(
        weighted: Vec<(Arc<dyn SelectionOperator<S>>, f64)>,
    ) -> Result<Self, Error> {
        Ok(Self {
            catalogue: OperatorCatalogue::saturated(weighted)?,
        })
    }

    /// Selector that always applies a single strategy.
    pub fn single(operator: Arc<dyn SelectionOperator<S>>) -> Self {
        Self {
            catalogue: OperatorCatalogue::saturated(vec![(operator, 1.0)])
                .expect("unit weight saturates the catalogue"),
        }
    }

    /// Draws one strategy and removes everything it does not keep.
    ///
    /// A population at or under `nkeep` is left untouched. Returns the
    /// evicted ids in population order.
    pub fn shrink<R: Rng>(
        &self,
        rng: &mut R,
        population: &mut Population<S>,
        scores: &BTreeMap<u64, f64>,
        nkeep: usize,
    ) -> Result<Vec<u64>, Error> {
        if population.len() <= nkeep {
            return Ok(Vec::new());
        }
        let operator = self
            .catalogue
            .select(rng)
            .ok_or_else(|| Error::Config("survivor catalogue drew no strategy".into()))?;

        let keep: std::collections::HashSet<u64> =
            operator.select(population, scores, nkeep).into_iter().collect();
        let evicted: Vec<u64> = population
            .iter()
            .map(crate::population::Individual::id)
            .filter(|id| !keep.contains(id))
            .collect();
        for id in &evicted {
            population.remove(*id);
        }
        log::info!(
            "survivor selection {} kept {} of {} members",
            operator.name(),
            population.len(),
            population.len() + evicted.len()
        );
        Ok(evicted)
    }
}
