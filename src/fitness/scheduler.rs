//! Fitness pass execution.

use super::jobs::{cores_per_job, EvalJob};
use super::types::FitnessScheme;
use crate::error::Error;
use crate::pool::WorkerPool;
use crate::population::{Individual, Population, Structure};
use crate::INVALID_SCORE;
use std::collections::BTreeMap;
use std::process::Child;
use std::sync::Arc;

/// How scoring jobs are dispatched. The strategies differ in resource
/// usage, not outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// One job per individual, run one at a time. Schemes with an
    /// external form run their job inline; in-process schemes simulate.
    Sequential,
    /// In-process simulation mapped over a bounded worker pool, results
    /// applied back by identity as the pool completes them.
    Pool,
    /// Batched external processes: eligible individuals share the
    /// machine, each job granted an even share of `cores` clamped to
    /// `[min_cores_per_job, max_cores_per_job]`.
    Batched {
        cores: usize,
        min_cores_per_job: usize,
        max_cores_per_job: usize,
    },
}

/// Scores the unfitted subset of a population and applies per-scheme
/// chi-squared scores back by identity.
pub struct FitnessScheduler<S: Structure> {
    schemes: Vec<Arc<dyn FitnessScheme<S>>>,
    dispatch: Dispatch,
    pool: Option<WorkerPool>,
    skip_failed_relaxations: bool,
}

impl<S: Structure> FitnessScheduler<S> {
    /// Creates a scheduler.
    ///
    /// # Errors
    ///
    /// Batched dispatch is validated here: an inconsistent cores-per-job
    /// range is [`Error::Config`], and a minimum exceeding the available
    /// cores is [`Error::InsufficientCores`] — surfaced before any pass
    /// runs, let alone any job launches.
    pub fn new(
        schemes: Vec<Arc<dyn FitnessScheme<S>>>,
        dispatch: Dispatch,
    ) -> Result<Self, Error> {
        if let Dispatch::Batched {
            cores,
            min_cores_per_job,
            max_cores_per_job,
        } = dispatch
        {
            cores_per_job(cores, 1, min_cores_per_job, max_cores_per_job)?;
        }
        Ok(Self {
            schemes,
            dispatch,
            pool: None,
            skip_failed_relaxations: false,
        })
    }

    /// Attaches the worker pool used by [`Dispatch::Pool`].
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Skips individuals whose relaxation is already known-bad, to avoid
    /// wasting an expensive evaluation on a structure that failed
    /// relaxation.
    ///
    /// The filter only engages once *every* member of the population has
    /// a relaxation score recorded (all-or-nothing, preserved from the
    /// reference behavior).
    pub fn with_skip_failed_relaxations(mut self, skip: bool) -> Self {
        self.skip_failed_relaxations = skip;
        self
    }

    /// Runs one fitness pass.
    ///
    /// Every eligible individual ends the pass with a terminal result per
    /// scheme — a real score or the sentinel — and `fitted` set. Returns
    /// the id → summed-scheme-score mapping for the eligible members.
    /// Re-running over a fully fitted population is a no-op.
    pub fn score(&self, population: &mut Population<S>) -> Result<BTreeMap<u64, f64>, Error> {
        let mut eligible: Vec<u64> = population
            .iter()
            .filter(|i| !i.fitted)
            .map(Individual::id)
            .collect();

        if self.skip_failed_relaxations
            && population.iter().all(Individual::has_relaxation_record)
        {
            eligible.retain(|&id| {
                population
                    .get(id)
                    .is_some_and(|i| !i.relaxation_failed())
            });
        }

        for scheme in &self.schemes {
            let todo: Vec<u64> = eligible
                .iter()
                .copied()
                .filter(|&id| population.get(id).is_some())
                .collect();
            if todo.is_empty() {
                continue;
            }
            log::info!(
                "scoring {} individuals with fitness scheme {}",
                todo.len(),
                scheme.name()
            );

            match self.dispatch {
                Dispatch::Sequential => {
                    for &id in &todo {
                        let score = match population.get(id) {
                            Some(individual) => evaluate_sequential(scheme.as_ref(), individual),
                            None => continue,
                        };
                        if let Some(individual) = population.get_mut(id) {
                            individual.set_fitness_score(scheme.name(), score);
                        }
                    }
                }
                Dispatch::Pool => self.score_pooled(scheme, population, &todo)?,
                Dispatch::Batched { .. } => self.score_batched(scheme, population, &todo)?,
            }
        }

        let mut scores = BTreeMap::new();
        for &id in &eligible {
            if let Some(individual) = population.get_mut(id) {
                individual.fitted = true;
                individual.modified = false;
                scores.insert(id, individual.total_fitness());
            }
        }
        Ok(scores)
    }

    fn score_pooled(
        &self,
        scheme: &Arc<dyn FitnessScheme<S>>,
        population: &mut Population<S>,
        todo: &[u64],
    ) -> Result<(), Error> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| Error::Config("pool dispatch requires a worker pool".into()))?;

        let copies: Vec<Individual<S>> = todo
            .iter()
            .filter_map(|&id| population.get(id).cloned())
            .collect();

        let scheme = Arc::clone(scheme);
        let scored = pool.map(copies, move |mut individual: Individual<S>| {
            let score = evaluate(scheme.as_ref(), &individual);
            individual.set_fitness_score(scheme.name(), score);
            individual
        });
        population.update(scored);
        Ok(())
    }

    /// Launches external jobs in waves sized to the core budget and
    /// harvests each wave before the next starts.
    fn score_batched(
        &self,
        scheme: &Arc<dyn FitnessScheme<S>>,
        population: &mut Population<S>,
        todo: &[u64],
    ) -> Result<(), Error> {
        let Dispatch::Batched {
            cores,
            min_cores_per_job: min,
            max_cores_per_job: max,
        } = self.dispatch
        else {
            return Err(Error::Config("batched scoring without batched dispatch".into()));
        };

        // Capacity errors surface here, before any job launches.
        let per_job = cores_per_job(cores, todo.len(), min, max)?;
        let wave = (cores / per_job).max(1).min(todo.len());

        if let Some(&first) = todo.first() {
            if let Some(individual) = population.get(first) {
                if scheme.job(individual, per_job).is_none() {
                    return Err(Error::Config(format!(
                        "fitness scheme {} has no external form required by batched dispatch",
                        scheme.name()
                    )));
                }
            }
        }

        for chunk in todo.chunks(wave) {
            // The last wave may be short; re-split so all granted cores
            // are used.
            let per_wave = cores_per_job(cores, chunk.len(), min, max)?;
            log::info!(
                "spawning {} {} jobs, each with {} cores",
                chunk.len(),
                scheme.name(),
                per_wave
            );

            let mut running: Vec<(u64, Option<(EvalJob, Child)>)> = Vec::new();
            for &id in chunk {
                let Some(individual) = population.get(id) else {
                    continue;
                };
                let slot = match scheme.job(individual, per_wave) {
                    Some(Ok(job)) => match job.launch() {
                        Ok(child) => Some((job, child)),
                        Err(err) => {
                            log::warn!(
                                "fitness {} job launch failed for individual {id}: {err}",
                                scheme.name()
                            );
                            None
                        }
                    },
                    Some(Err(err)) => {
                        log::warn!(
                            "fitness {} job setup failed for individual {id}: {err}",
                            scheme.name()
                        );
                        None
                    }
                    None => None,
                };
                running.push((id, slot));
            }

            for (id, slot) in running {
                let score = match slot {
                    Some((job, mut child)) => match job.harvest(&mut child) {
                        Ok(curve) => scheme.reference().chi_squared(&curve),
                        Err(err) => {
                            log::warn!(
                                "fitness {} job for individual {id} failed: {err}",
                                scheme.name()
                            );
                            INVALID_SCORE
                        }
                    },
                    None => INVALID_SCORE,
                };
                if let Some(individual) = population.get_mut(id) {
                    individual.set_fitness_score(scheme.name(), score);
                }
            }
        }
        Ok(())
    }
}

/// Sequential evaluation: an external-form scheme launches and harvests
/// its job inline (one core, one job at a time); anything else simulates.
fn evaluate_sequential<S: Structure>(
    scheme: &dyn FitnessScheme<S>,
    individual: &Individual<S>,
) -> f64 {
    let outcome = match scheme.job(individual, 1) {
        Some(Ok(job)) => job.run(),
        Some(Err(err)) => Err(err),
        None => scheme.simulate(individual),
    };
    match outcome {
        Ok(curve) => scheme.reference().chi_squared(&curve),
        Err(err) => {
            log::warn!(
                "fitness {} failed for individual {}: {err}",
                scheme.name(),
                individual.id()
            );
            INVALID_SCORE
        }
    }
}

/// Simulates the observable and compares it against the scheme's
/// reference, absorbing failures into the sentinel.
fn evaluate<S: Structure>(scheme: &dyn FitnessScheme<S>, individual: &Individual<S>) -> f64 {
    match scheme.simulate(individual) {
        Ok(curve) => scheme.reference().chi_squared(&curve),
        Err(err) => {
            log::warn!(
                "fitness {} failed for individual {}: {err}",
                scheme.name(),
                individual.id()
            );
            INVALID_SCORE
        }
    }
}
