use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use sig_rs::stats::{basic_statistics, detect_outliers, histogram, HistogramBins};

fn randomized_samples(mut rng: impl Rng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.random_range(-100.0..100.0)).collect()
}

fn describe(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");
    for exp in [10u32, 14, 18] {
        let n = 1usize << exp;
        let data = randomized_samples(rand::rng(), n);
        group.bench_with_input(BenchmarkId::new("basic_statistics", n), &data, |bench, d| {
            bench.iter(|| basic_statistics(black_box(d)))
        });
        group.bench_with_input(BenchmarkId::new("histogram", n), &data, |bench, d| {
            bench.iter(|| histogram(black_box(d), HistogramBins::Count(64)))
        });
        group.bench_with_input(BenchmarkId::new("detect_outliers", n), &data, |bench, d| {
            bench.iter(|| detect_outliers(black_box(d), 1.5))
        });
    }
    group.finish();
}

criterion_group!(benches, describe);
criterion_main!(benches);
