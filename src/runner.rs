//! Generation loop.
//!
//! Wires the per-generation control flow: crossover produces children,
//! children join the population, relaxation runs and evicts failures,
//! fitness scoring assigns terminal results, and survivor selection cuts
//! the population back to its target size. Each pass leaves the
//! population consistent — a fully processed population passes through
//! unchanged.

use crate::crossover::{CrossoverEngine, CrossoverOperator};
use crate::error::Error;
use crate::fitness::FitnessScheduler;
use crate::population::{Population, Structure};
use crate::random::{create_rng, derive_seed};
use crate::relaxation::RelaxationScheduler;
use crate::selection::SurvivorSelector;

/// Counters from one generation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub generation: u64,
    /// Children produced by crossover and appended to the population.
    pub children: usize,
    /// Members evicted for failed relaxation.
    pub evicted: Vec<u64>,
    /// Members that received a fitness result this step.
    pub scored: usize,
    /// Population size after survivor selection.
    pub survivors: usize,
}

/// Drives generations over a population.
///
/// The survivor-selection draw for each generation uses an RNG stream
/// derived from the runner seed and the generation index, so a rerun from
/// the same seed reproduces the same strategy sequence.
pub struct GenerationRunner<S: Structure, O: CrossoverOperator<S>> {
    crossover: CrossoverEngine<S, O>,
    relaxation: RelaxationScheduler<S>,
    fitness: FitnessScheduler<S>,
    selector: SurvivorSelector<S>,
    nkeep: usize,
    seed: u64,
    generation: u64,
}

impl<S: Structure, O: CrossoverOperator<S>> GenerationRunner<S, O> {
    /// # Errors
    ///
    /// [`Error::Config`] when `nkeep` is zero.
    pub fn new(
        crossover: CrossoverEngine<S, O>,
        relaxation: RelaxationScheduler<S>,
        fitness: FitnessScheduler<S>,
        selector: SurvivorSelector<S>,
        nkeep: usize,
        seed: u64,
    ) -> Result<Self, Error> {
        if nkeep == 0 {
            return Err(Error::Config("nkeep must be at least 1".into()));
        }
        Ok(Self {
            crossover,
            relaxation,
            fitness,
            selector,
            nkeep,
            seed,
            generation: 0,
        })
    }

    /// Generations completed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs one generation, mutating the population in place.
    pub fn step(&mut self, population: &mut Population<S>) -> Result<GenerationStats, Error> {
        log::info!(
            "generation {}: {} members entering",
            self.generation,
            population.len()
        );

        let children = self.crossover.crossover(population)?;
        let nchildren = children.len();
        for child in children {
            population.push(child);
        }

        let relax_report = self.relaxation.relax(population)?;
        let scores = self.fitness.score(population)?;

        // Survivor selection ranks the whole population, not just this
        // step's eligible subset; previously fitted members keep their
        // recorded totals.
        let mut ranking = scores.clone();
        for individual in population.iter() {
            if individual.fitted {
                ranking
                    .entry(individual.id())
                    .or_insert_with(|| individual.total_fitness());
            }
        }

        let mut rng = create_rng(derive_seed(self.seed, self.generation));
        self.selector
            .shrink(&mut rng, population, &ranking, self.nkeep)?;

        let stats = GenerationStats {
            generation: self.generation,
            children: nchildren,
            evicted: relax_report.evicted,
            scored: scores.len(),
            survivors: population.len(),
        };
        log::info!(
            "generation {}: {} children, {} evicted, {} scored, {} survivors",
            stats.generation,
            stats.children,
            stats.evicted.len(),
            stats.scored,
            stats.survivors
        );
        self.generation += 1;
        Ok(stats)
    }

    /// Runs `generations` steps, returning the stats of each.
    pub fn run(
        &mut self,
        population: &mut Population<S>,
        generations: u64,
    ) -> Result<Vec<GenerationStats>, Error> {
        let mut all = Vec::with_capacity(generations as usize);
        for _ in 0..generations {
            all.push(self.step(population)?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use crate::fitness::{Dispatch, FitnessScheme, ReferenceCurve};
    use crate::population::Individual;
    use crate::relaxation::RelaxationModule;
    use crate::selection::{CostSelection, SurvivorSelector};
    use crate::selector::OperatorCatalogue;
    use std::io;
    use std::path::Path;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Gene(f64);

    impl Structure for Gene {
        fn write_input(&self, path: &Path) -> io::Result<()> {
            std::fs::write(path, self.0.to_string())
        }
    }

    /// Children average their parents' values.
    struct Blend;

    impl CrossoverOperator<Gene> for Blend {
        fn tag(&self) -> &str {
            "Bl"
        }

        fn apply<R: rand::Rng>(
            &self,
            p1: &Gene,
            p2: &Gene,
            _rng: &mut R,
        ) -> (Option<Gene>, Option<Gene>) {
            let mid = (p1.0 + p2.0) / 2.0;
            (Some(Gene(mid)), Some(Gene(mid + 1.0)))
        }
    }

    /// Pulls the value toward zero; values past the cutoff fail.
    struct Settle {
        cutoff: f64,
    }

    impl RelaxationModule<Gene> for Settle {
        fn name(&self) -> &str {
            "settle"
        }

        fn relax(&self, individual: &mut Individual<Gene>) -> Result<f64, EvalError> {
            if individual.structure().0 > self.cutoff {
                return Err(EvalError::Solver { status: 1 });
            }
            individual.structure_mut().0 *= 0.9;
            Ok(individual.structure().0)
        }
    }

    /// Flat-zero reference, so the score is the squared value.
    struct Square {
        reference: ReferenceCurve,
    }

    impl Square {
        fn new() -> Self {
            Self {
                reference: ReferenceCurve::new(vec![(0.0, 0.0)]),
            }
        }
    }

    impl FitnessScheme<Gene> for Square {
        fn name(&self) -> &str {
            "square"
        }

        fn reference(&self) -> &ReferenceCurve {
            &self.reference
        }

        fn simulate(&self, individual: &Individual<Gene>) -> Result<Vec<(f64, f64)>, EvalError> {
            Ok(vec![(0.0, individual.structure().0)])
        }
    }

    fn make_runner(cutoff: f64, nkeep: usize) -> GenerationRunner<Gene, Blend> {
        let catalogue = OperatorCatalogue::saturated(vec![(Blend, 1.0)]).unwrap();
        GenerationRunner::new(
            CrossoverEngine::new(catalogue, 42),
            RelaxationScheduler::direct(vec![Arc::new(Settle { cutoff })]),
            FitnessScheduler::new(vec![Arc::new(Square::new())], Dispatch::Sequential).unwrap(),
            SurvivorSelector::single(Arc::new(CostSelection)),
            nkeep,
            42,
        )
        .unwrap()
    }

    fn make_population(values: &[f64]) -> Population<Gene> {
        Population::from_members(
            values
                .iter()
                .enumerate()
                .map(|(id, &v)| Individual::new(id as u64, Gene(v)))
                .collect(),
        )
    }

    #[test]
    fn test_step_produces_scored_survivors() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut runner = make_runner(f64::INFINITY, 4);
        let mut pop = make_population(&[1.0, 2.0, 3.0, 4.0]);
        let stats = runner.step(&mut pop).unwrap();

        assert_eq!(stats.generation, 0);
        assert_eq!(stats.children, 4); // 2 pairs × 2
        assert!(stats.evicted.is_empty());
        assert_eq!(stats.scored, 8); // parents and children all unfitted
        assert_eq!(stats.survivors, 4);
        assert_eq!(pop.len(), 4);
        for ind in &pop {
            assert!(ind.relaxed);
            assert!(ind.fitted);
        }
    }

    #[test]
    fn test_relaxation_failures_evicted_before_selection() {
        let mut runner = make_runner(3.5, 10);
        // Parents 4.0 and 5.0 exceed the cutoff; their child (4.5) does too.
        let mut pop = make_population(&[1.0, 2.0, 4.0, 5.0]);
        let stats = runner.step(&mut pop).unwrap();

        assert!(stats.evicted.contains(&2));
        assert!(stats.evicted.contains(&3));
        assert!(pop.get(2).is_none());
        assert!(pop.get(3).is_none());
        assert_eq!(stats.survivors, pop.len());
    }

    #[test]
    fn test_selection_keeps_lowest_scores() {
        let mut runner = make_runner(f64::INFINITY, 2);
        let mut pop = make_population(&[0.1, 0.2, 8.0, 9.0]);
        runner.step(&mut pop).unwrap();

        assert_eq!(pop.len(), 2);
        // The settled small parents score far below the large ones and the
        // blended children near 4-5.
        for ind in &pop {
            assert!(ind.structure().0 < 1.0, "kept {:?}", ind.structure());
        }
    }

    #[test]
    fn test_stats_count_generations() {
        let mut runner = make_runner(f64::INFINITY, 3);
        let mut pop = make_population(&[1.0, 2.0, 3.0]);
        let all = runner.run(&mut pop, 3).unwrap();

        assert_eq!(all.len(), 3);
        assert_eq!(all[0].generation, 0);
        assert_eq!(all[2].generation, 2);
        assert_eq!(runner.generation(), 3);
        assert!(pop.len() <= 3);
    }

    #[test]
    fn test_zero_nkeep_rejected() {
        let catalogue = OperatorCatalogue::saturated(vec![(Blend, 1.0)]).unwrap();
        let result = GenerationRunner::new(
            CrossoverEngine::new(catalogue, 1),
            RelaxationScheduler::direct(vec![]),
            FitnessScheduler::new(vec![], Dispatch::Sequential).unwrap(),
            SurvivorSelector::single(Arc::new(CostSelection)),
            0,
            1,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_noop_catalogue_pass_changes_nothing() {
        // No crossover mass: no children, and a fully processed population
        // passes through untouched.
        let catalogue = OperatorCatalogue::<Blend>::new(vec![]).unwrap();
        let mut runner = GenerationRunner::new(
            CrossoverEngine::new(catalogue, 42),
            RelaxationScheduler::direct(vec![Arc::new(Settle {
                cutoff: f64::INFINITY,
            })]),
            FitnessScheduler::new(vec![Arc::new(Square::new())], Dispatch::Sequential).unwrap(),
            SurvivorSelector::single(Arc::new(CostSelection)),
            4,
            42,
        )
        .unwrap();

        let mut pop = make_population(&[1.0, 2.0, 3.0, 4.0]);
        runner.step(&mut pop).unwrap();
        let before: Vec<(u64, f64)> =
            pop.iter().map(|i| (i.id(), i.structure().0)).collect();

        let stats = runner.step(&mut pop).unwrap();
        assert_eq!(stats.children, 0);
        assert!(stats.evicted.is_empty());
        assert_eq!(stats.scored, 0);
        let after: Vec<(u64, f64)> =
            pop.iter().map(|i| (i.id(), i.structure().0)).collect();
        assert_eq!(before, after);
    }
}
