//! Individual: opaque structure payload plus scheduling metadata.

use crate::INVALID_SCORE;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// The opaque candidate-structure payload.
///
/// The scheduling core never interprets a structure's contents. The only
/// operation it needs is persisting the structure to a solver-readable
/// input file for external evaluation jobs.
pub trait Structure: Clone + Send + Sync + 'static {
    /// Writes this structure to `path` in a format the external solver
    /// can read.
    fn write_input(&self, path: &Path) -> io::Result<()>;
}

/// One candidate structure plus its scheduling metadata.
///
/// Invariants maintained by the schedulers:
///
/// - `fitted == true` implies every configured fitness scheme has a
///   recorded score (real or sentinel).
/// - `relaxed == true` implies every configured relaxation module has run
///   at least once, or the individual was evicted before the flag flip.
#[derive(Debug, Clone)]
pub struct Individual<S> {
    id: u64,
    structure: S,
    /// Became unevaluated because it was just created or mutated.
    pub modified: bool,
    /// Relaxation has already been applied.
    pub relaxed: bool,
    /// Fitness has already been computed.
    pub fitted: bool,
    /// Scheme name → chi-squared-style score.
    fitness_scores: BTreeMap<String, f64>,
    /// Module name → relaxation score.
    relaxation_scores: BTreeMap<String, f64>,
    /// Free-text provenance, e.g. `"(3+7)Ro"` for a child of parents 3
    /// and 7 produced by the `Ro` operator.
    pub lineage: String,
}

impl<S> Individual<S> {
    /// Creates a fresh, unevaluated individual with a known id.
    pub fn new(id: u64, structure: S) -> Self {
        Self {
            id,
            structure,
            modified: true,
            relaxed: false,
            fitted: false,
            fitness_scores: BTreeMap::new(),
            relaxation_scores: BTreeMap::new(),
            lineage: String::new(),
        }
    }

    /// Creates a crossover child. The id is assigned by the population
    /// during reconciliation, never by the worker that produced the child.
    pub(crate) fn offspring(structure: S, lineage: String) -> Self {
        let mut child = Self::new(0, structure);
        child.lineage = lineage;
        child
    }

    /// Stable identity, unique within a run.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    pub fn structure(&self) -> &S {
        &self.structure
    }

    pub fn structure_mut(&mut self) -> &mut S {
        &mut self.structure
    }

    /// Marks the individual as needing full re-evaluation, dropping all
    /// recorded scores.
    pub fn mark_unevaluated(&mut self) {
        self.modified = true;
        self.relaxed = false;
        self.fitted = false;
        self.fitness_scores.clear();
        self.relaxation_scores.clear();
    }

    pub fn set_fitness_score(&mut self, scheme: &str, score: f64) {
        self.fitness_scores.insert(scheme.to_string(), score);
    }

    pub fn fitness_score(&self, scheme: &str) -> Option<f64> {
        self.fitness_scores.get(scheme).copied()
    }

    /// Sum of all recorded fitness scores. A sentinel in any scheme makes
    /// the total the sentinel as well.
    pub fn total_fitness(&self) -> f64 {
        self.fitness_scores.values().sum()
    }

    pub fn set_relaxation_score(&mut self, module: &str, score: f64) {
        self.relaxation_scores.insert(module.to_string(), score);
    }

    pub fn relaxation_score(&self, module: &str) -> Option<f64> {
        self.relaxation_scores.get(module).copied()
    }

    /// True if any relaxation module left the sentinel invalid score.
    pub fn relaxation_failed(&self) -> bool {
        self.relaxation_scores
            .values()
            .any(|&s| s == INVALID_SCORE)
    }

    /// True if at least one relaxation score has ever been recorded.
    pub fn has_relaxation_record(&self) -> bool {
        !self.relaxation_scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Blob(u8);

    impl Structure for Blob {
        fn write_input(&self, path: &Path) -> io::Result<()> {
            std::fs::write(path, [self.0])
        }
    }

    #[test]
    fn test_new_is_unevaluated() {
        let ind = Individual::new(3, Blob(1));
        assert_eq!(ind.id(), 3);
        assert!(ind.modified);
        assert!(!ind.relaxed);
        assert!(!ind.fitted);
        assert!(!ind.has_relaxation_record());
    }

    #[test]
    fn test_score_maps() {
        let mut ind = Individual::new(1, Blob(0));
        ind.set_fitness_score("rdf", 2.5);
        ind.set_fitness_score("femsim", 1.5);
        assert_eq!(ind.fitness_score("rdf"), Some(2.5));
        assert_eq!(ind.fitness_score("missing"), None);
        assert!((ind.total_fitness() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_sentinel_propagates_into_total() {
        let mut ind = Individual::new(1, Blob(0));
        ind.set_fitness_score("rdf", 2.5);
        ind.set_fitness_score("femsim", INVALID_SCORE);
        assert_eq!(ind.total_fitness(), INVALID_SCORE);
    }

    #[test]
    fn test_relaxation_failure_detection() {
        let mut ind = Individual::new(1, Blob(0));
        ind.set_relaxation_score("lammps", 0.7);
        assert!(!ind.relaxation_failed());
        ind.set_relaxation_score("hard_sphere", INVALID_SCORE);
        assert!(ind.relaxation_failed());
    }

    #[test]
    fn test_mark_unevaluated_clears_state() {
        let mut ind = Individual::new(1, Blob(0));
        ind.relaxed = true;
        ind.fitted = true;
        ind.modified = false;
        ind.set_fitness_score("rdf", 1.0);
        ind.set_relaxation_score("lammps", 1.0);

        ind.mark_unevaluated();

        assert!(ind.modified);
        assert!(!ind.relaxed);
        assert!(!ind.fitted);
        assert_eq!(ind.fitness_score("rdf"), None);
        assert!(!ind.has_relaxation_record());
    }
}
