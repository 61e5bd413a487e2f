//! Benchmarks for selection and reproduction.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use hope_evolve::{
    evolution::{IdGenerator, LineageTracker, OperatorRng, Reproducer, cut},
    schema::{Candidate, CandidateStatus, EngineConfig, Payload, ResourceRefs},
};

fn population(size: usize, ids: &mut IdGenerator, lineage: &mut LineageTracker) -> Vec<Candidate> {
    (0..size)
        .map(|i| {
            let resources = ResourceRefs {
                tools: ["toolA", "toolB"].iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            };
            let payload = Payload::new(
                format!("You are agent number {i}."),
                "Summarise the quarterly report and list the three main risks.",
            )
            .with_resources(resources);
            let mut c = Candidate::new(ids.next_id().unwrap(), payload, 0);
            c.score = (i * 37 % 100) as f64;
            c.status = CandidateStatus::Completed;
            lineage.register_or_update(&c);
            c
        })
        .collect()
}

fn bench_cut(c: &mut Criterion) {
    let mut group = c.benchmark_group("cut");

    for size in [10, 100, 1000] {
        let mut ids = IdGenerator::new();
        let mut lineage = LineageTracker::new();
        let pop = population(size, &mut ids, &mut lineage);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter_batched(
                || (pop.clone(), lineage.clone()),
                |(pop, mut lineage)| cut(black_box(pop), 50.0, &mut lineage),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_reproduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reproduce");

    for size in [10, 100, 1000] {
        let config = EngineConfig::new(50.0, 95.0)
            .with_population_size(size)
            .with_seed(42);
        let mut ids = IdGenerator::new();
        let mut lineage = LineageTracker::new();
        let survivors: Vec<Candidate> = population(size, &mut ids, &mut lineage)
            .into_iter()
            .filter(|c| c.score >= config.threshold)
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter_batched(
                || (ids.clone(), lineage.clone(), OperatorRng::new(7)),
                |(mut ids, mut lineage, mut rng)| {
                    Reproducer::new(&config, &mut ids, &mut lineage, &mut rng)
                        .reproduce(black_box(&survivors), 1)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cut, bench_reproduce);
criterion_main!(benches);
