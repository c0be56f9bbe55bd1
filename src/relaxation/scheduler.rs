//! Relaxation pass execution.

use super::types::{RelaxMode, RelaxationModule};
use crate::error::Error;
use crate::pool::{ShardPlan, WorkerPool};
use crate::population::{Individual, Population, Structure};
use crate::INVALID_SCORE;
use std::sync::Arc;

/// Outcome of one relaxation pass.
#[derive(Debug, Clone, Default)]
pub struct RelaxReport {
    /// Members flagged `relaxed` by this pass.
    pub relaxed: usize,
    /// Members evicted because a module left the sentinel score.
    pub evicted: Vec<u64>,
}

/// Runs configured relaxation modules over the unrelaxed subset of a
/// population.
///
/// Modules run in declared order; an individual evicted by an earlier
/// module's failure simply never reaches the flag flip — evicted members
/// are gone, no flag update applies to them.
pub struct RelaxationScheduler<S: Structure> {
    modules: Vec<Arc<dyn RelaxationModule<S>>>,
    mode: RelaxMode,
    pool: Option<WorkerPool>,
}

impl<S: Structure> RelaxationScheduler<S> {
    /// Scheduler that relaxes each individual synchronously in-process.
    pub fn direct(modules: Vec<Arc<dyn RelaxationModule<S>>>) -> Self {
        Self {
            modules,
            mode: RelaxMode::Direct,
            pool: None,
        }
    }

    /// Scheduler that dispatches copies to `pool` and applies the
    /// returned copies back by identity.
    pub fn pooled(modules: Vec<Arc<dyn RelaxationModule<S>>>, pool: WorkerPool) -> Self {
        Self {
            modules,
            mode: RelaxMode::Pool,
            pool: Some(pool),
        }
    }

    pub fn mode(&self) -> RelaxMode {
        self.mode
    }

    /// Runs one relaxation pass, mutating the population in place.
    ///
    /// Sets module scores, evicts members whose relaxation failed, and
    /// flips `relaxed` on the surviving members that were eligible when
    /// the pass began. Re-running over a fully relaxed population is a
    /// no-op.
    pub fn relax(&self, population: &mut Population<S>) -> Result<RelaxReport, Error> {
        let eligible: Vec<u64> = population
            .iter()
            .filter(|i| !i.relaxed)
            .map(Individual::id)
            .collect();

        for module in &self.modules {
            // Members evicted mid-pass by a previous module would simply
            // be absent; eviction here happens after all modules, so this
            // re-filter guards only against external removal.
            let todo: Vec<u64> = eligible
                .iter()
                .copied()
                .filter(|&id| population.get(id).is_some())
                .collect();
            if todo.is_empty() {
                continue;
            }
            log::info!(
                "running relaxation {} on {} individuals",
                module.name(),
                todo.len()
            );

            match self.mode {
                RelaxMode::Direct => {
                    for id in &todo {
                        if let Some(individual) = population.get_mut(*id) {
                            apply_module(module.as_ref(), individual);
                        }
                    }
                }
                RelaxMode::Pool => {
                    let pool = self
                        .pool
                        .as_ref()
                        .ok_or_else(|| Error::Config("pool mode requires a worker pool".into()))?;
                    self.relax_pooled(module, pool, population, &todo)?;
                }
            }
        }

        let failed: Vec<u64> = population
            .iter()
            .filter(|i| i.relaxation_failed())
            .map(Individual::id)
            .collect();
        for id in &failed {
            population.remove(*id);
            log::info!("individual {id} failed relaxation; removed from population");
        }

        let mut relaxed = 0;
        for id in &eligible {
            if let Some(individual) = population.get_mut(*id) {
                individual.relaxed = true;
                relaxed += 1;
            }
        }

        Ok(RelaxReport {
            relaxed,
            evicted: failed,
        })
    }

    /// Partitions eligible copies across the pool's workers, relaxes each
    /// shard, and merges the results back in canonical order before the
    /// population applies them by identity.
    fn relax_pooled(
        &self,
        module: &Arc<dyn RelaxationModule<S>>,
        pool: &WorkerPool,
        population: &mut Population<S>,
        todo: &[u64],
    ) -> Result<(), Error> {
        let plan = ShardPlan::new(todo.len(), pool.workers());
        let shards: Vec<Vec<Individual<S>>> = (0..plan.workers())
            .map(|worker| {
                plan.indices(worker)
                    .iter()
                    .filter_map(|&i| population.get(todo[i]).cloned())
                    .collect()
            })
            .collect();

        let module = Arc::clone(module);
        let parts = pool.map(shards, move |shard: Vec<Individual<S>>| {
            shard
                .into_iter()
                .map(|mut individual| {
                    apply_module(module.as_ref(), &mut individual);
                    individual
                })
                .collect::<Vec<_>>()
        });

        let merged = plan.merge(parts)?;
        population.update(merged);
        Ok(())
    }
}

/// Records the module's score, absorbing failures into the sentinel.
fn apply_module<S: Structure>(module: &dyn RelaxationModule<S>, individual: &mut Individual<S>) {
    let name = module.name().to_string();
    match module.relax(individual) {
        Ok(score) => individual.set_relaxation_score(&name, score),
        Err(err) => {
            log::warn!(
                "relaxation {name} failed for individual {}: {err}",
                individual.id()
            );
            individual.set_relaxation_score(&name, INVALID_SCORE);
        }
    }
}
