//! Criterion benchmarks for the scheduling primitives.
//!
//! Uses synthetic structures (byte genomes) to measure scheduler and
//! reconciliation overhead independent of any real solver.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evosched::cluster::disjoint_set_merge;
use evosched::crossover::{CrossoverEngine, CrossoverOperator};
use evosched::pool::WorkerPool;
use evosched::population::{Individual, Population, Structure};
use evosched::random::create_rng;
use evosched::selector::OperatorCatalogue;
use std::io;
use std::path::Path;

// ===========================================================================
// Synthetic structure: fixed-length byte genome
// ===========================================================================

#[derive(Clone)]
struct Genome(Vec<u8>);

impl Structure for Genome {
    fn write_input(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, &self.0)
    }
}

struct Splice;

impl CrossoverOperator<Genome> for Splice {
    fn tag(&self) -> &str {
        "Sp"
    }

    fn apply<R: rand::Rng>(
        &self,
        p1: &Genome,
        p2: &Genome,
        rng: &mut R,
    ) -> (Option<Genome>, Option<Genome>) {
        let point = rng.random_range(0..p1.0.len());
        let mut c1 = p1.0[..point].to_vec();
        c1.extend_from_slice(&p2.0[point..]);
        let mut c2 = p2.0[..point].to_vec();
        c2.extend_from_slice(&p1.0[point..]);
        (Some(Genome(c1)), Some(Genome(c2)))
    }
}

fn make_population(members: usize, genome_len: usize) -> Population<Genome> {
    Population::from_members(
        (0..members as u64)
            .map(|id| Individual::new(id, Genome(vec![id as u8; genome_len])))
            .collect(),
    )
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_catalogue_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalogue_select");

    for &ops in &[4usize, 16, 64] {
        let weighted: Vec<(usize, f64)> = (0..ops).map(|i| (i, 0.9 / ops as f64)).collect();
        let catalogue = OperatorCatalogue::new(weighted).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(ops), &catalogue, |b, cat| {
            let mut rng = create_rng(42);
            b.iter(|| black_box(cat.select(&mut rng)))
        });
    }
    group.finish();
}

fn bench_disjoint_set_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("disjoint_set_merge");
    group.sample_size(20);

    for &n in &[100usize, 1000, 10000] {
        let elements: Vec<usize> = (0..n).collect();
        // Chain half the universe into one cluster, leave the rest as
        // singletons.
        let pairs: Vec<(usize, usize)> = (0..n / 2 - 1).map(|i| (i, i + 1)).collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(elements, pairs),
            |b, (elements, pairs)| {
                b.iter(|| {
                    let clusters =
                        disjoint_set_merge(black_box(elements.clone()), black_box(pairs));
                    black_box(clusters)
                })
            },
        );
    }
    group.finish();
}

fn bench_crossover_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("crossover_pass");
    group.sample_size(20);

    for (members, workers) in [(64usize, 1usize), (64, 4), (512, 1), (512, 4)] {
        let catalogue = OperatorCatalogue::new(vec![(Splice, 0.8)]).unwrap();
        let mut engine = CrossoverEngine::new(catalogue, 42);
        if workers > 1 {
            engine = engine.with_pool(WorkerPool::new(workers).unwrap());
        }
        group.bench_function(
            BenchmarkId::new(format!("m{}_w{}", members, workers), members),
            |b| {
                b.iter(|| {
                    let mut pop = make_population(members, 128);
                    let children = engine.crossover(black_box(&mut pop));
                    black_box(children)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_catalogue_select,
    bench_disjoint_set_merge,
    bench_crossover_pass
);
criterion_main!(benches);
