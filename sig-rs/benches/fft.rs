use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use sig_rs::signal::fft::{fft, FftConfig, FftDirection, Radix2Fft};
use sig_rs::kernel::KernelLifecycle;
use sig_rs::signal::spectral::{power_spectral_density, spectrogram};
use sig_rs::signal::traits::Transform1D;
use sig_rs::signal::windows::WindowType;

fn randomized_signal(mut rng: impl Rng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn fft_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft");
    for exp in [8u32, 12, 16] {
        let n = 1usize << exp;
        let signal = randomized_signal(rand::rng(), n);
        group.bench_with_input(BenchmarkId::new("convenience", n), &signal, |bench, sig| {
            bench.iter(|| fft(black_box(sig)))
        });

        let plan = Radix2Fft::try_new(FftConfig {
            len: n,
            direction: FftDirection::Forward,
        })
        .expect("power-of-two plan should be valid");
        group.bench_with_input(BenchmarkId::new("planned", n), &signal, |bench, sig| {
            bench.iter(|| plan.run_alloc(black_box(sig.as_slice())))
        });
    }
    group.finish();
}

fn spectral(c: &mut Criterion) {
    let signal = randomized_signal(rand::rng(), 1 << 14);
    c.bench_with_input(BenchmarkId::new("psd", signal.len()), &signal, |bench, sig| {
        bench.iter(|| power_spectral_density(black_box(sig), 8000.0, WindowType::Hanning))
    });
    c.bench_with_input(
        BenchmarkId::new("spectrogram", signal.len()),
        &signal,
        |bench, sig| bench.iter(|| spectrogram(black_box(sig), 8000.0, 256, 0.5)),
    );
}

criterion_group!(benches, fft_sizes, spectral);
criterion_main!(benches);
