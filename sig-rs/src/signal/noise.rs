//! Random noise sequences.
//!
//! Every generator draws uniforms through [`RngCore::next_u32`] scaled by
//! `2^-32`. Passing a seed selects the [`Lcg`] source, which makes the output
//! reproducible bit for bit; without a seed the thread-local generator from
//! `rand` is used.

use crate::kernel::{ensure_finite, ConfigError, ExecInvariantViolation, KernelLifecycle};
use crate::kernel::{Read1D, Write1D};
use crate::Result;
use core::f64::consts::PI;
use rand::RngCore;

const PINK_GENERATORS: usize = 16;
const BROWN_STEP: f64 = 0.1;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Linear congruential generator `state = state * 1664525 + 1013904223 (mod 2^32)`.
///
/// Each draw advances the state and returns it, so `next_u32() / 2^32` is the
/// uniform sample in `[0, 1)`.
///
/// ```
/// use rand::RngCore;
/// use sig_rs::signal::noise::Lcg;
///
/// let mut lcg = Lcg::new(0);
/// assert_eq!(lcg.next_u32(), 1_013_904_223);
/// assert_eq!(lcg.next_u32(), 1_196_435_762);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Multiplier of the recurrence.
    pub const MULTIPLIER: u32 = 1_664_525;
    /// Increment of the recurrence.
    pub const INCREMENT: u32 = 1_013_904_223;

    /// Start the sequence at `seed`.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current state, which is also the last value returned.
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
        self.state
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_u32());
        let lo = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

fn uniform<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.next_u32()) / TWO_POW_32
}

/// Noise colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoiseKind {
    /// Gaussian white noise.
    #[default]
    White,
    /// Approximate 1/f noise.
    Pink,
    /// Random-walk (1/f²) noise.
    Brown,
}

/// Noise description used by [`NoiseKernel`] and [`add_noise`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseConfig {
    /// Noise colour.
    pub kind: NoiseKind,
    /// Scale applied to every sample.
    pub amplitude: f64,
    /// Seed for the [`Lcg`] source. `None` draws from the thread-local generator.
    pub seed: Option<u32>,
}

impl NoiseConfig {
    /// Unseeded noise of the given colour and amplitude.
    pub fn new(kind: NoiseKind, amplitude: f64) -> Self {
        Self {
            kind,
            amplitude,
            seed: None,
        }
    }

    /// Use the reproducible [`Lcg`] source starting at `seed`.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Gaussian white noise from `rng` by the Box–Muller transform.
///
/// Each output consumes two uniform draws. A zero first draw is replaced by the
/// smallest positive normal `f64` so the logarithm stays finite.
pub fn white_noise_with<R: RngCore + ?Sized>(rng: &mut R, out: &mut [f64], amplitude: f64) {
    for y in out.iter_mut() {
        let u1 = uniform(rng).max(f64::MIN_POSITIVE);
        let u2 = uniform(rng);
        *y = amplitude * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    }
}

/// Voss–McCartney pink noise from `rng`.
///
/// Sixteen generators are summed; generator `j` draws a fresh value in
/// `[-1, 1)` whenever bit `j` of the sample index is clear.
pub fn pink_noise_with<R: RngCore + ?Sized>(rng: &mut R, out: &mut [f64], amplitude: f64) {
    let mut values = [0.0f64; PINK_GENERATORS];
    let mut sum = 0.0;
    for (i, y) in out.iter_mut().enumerate() {
        for (j, value) in values.iter_mut().enumerate() {
            if (i >> j) & 1 == 0 {
                sum -= *value;
                *value = (uniform(rng) - 0.5) * 2.0;
                sum += *value;
            }
        }
        *y = amplitude * sum / PINK_GENERATORS as f64;
    }
}

/// Brown noise from `rng`: a random walk with steps uniform in `[-0.05, 0.05)`.
pub fn brown_noise_with<R: RngCore + ?Sized>(rng: &mut R, out: &mut [f64], amplitude: f64) {
    let mut value = 0.0;
    for y in out.iter_mut() {
        value += (uniform(rng) - 0.5) * BROWN_STEP;
        *y = amplitude * value;
    }
}

/// Trait-first noise generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseKernel {
    config: NoiseConfig,
}

impl NoiseKernel {
    /// Fill `out` with noise.
    pub fn run_into<O>(&self, out: &mut O) -> core::result::Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        match self.config.seed {
            Some(seed) => self.fill(&mut Lcg::new(seed), out),
            None => self.fill(&mut rand::rng(), out),
        }
        Ok(())
    }

    /// Generate `len` noise samples.
    pub fn run_alloc(&self, len: usize) -> Vec<f64> {
        let mut out = vec![0.0; len];
        match self.config.seed {
            Some(seed) => self.fill(&mut Lcg::new(seed), &mut out),
            None => self.fill(&mut rand::rng(), &mut out),
        }
        out
    }

    /// Return `signal` with a fresh noise sequence of matching length added.
    pub fn run_add<I>(&self, signal: &I) -> core::result::Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let signal = signal.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut noisy = self.run_alloc(signal.len());
        noisy.iter_mut().zip(signal.iter()).for_each(|(n, x)| *n += x);
        Ok(noisy)
    }

    fn fill<R: RngCore + ?Sized>(&self, rng: &mut R, out: &mut [f64]) {
        let amplitude = self.config.amplitude;
        match self.config.kind {
            NoiseKind::White => white_noise_with(rng, out, amplitude),
            NoiseKind::Pink => pink_noise_with(rng, out, amplitude),
            NoiseKind::Brown => brown_noise_with(rng, out, amplitude),
        }
    }
}

impl KernelLifecycle for NoiseKernel {
    type Config = NoiseConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        ensure_finite("amplitude", config.amplitude)?;
        Ok(Self { config })
    }
}

fn generate(samples: usize, config: NoiseConfig) -> Result<Vec<f64>> {
    Ok(NoiseKernel::try_new(config)?.run_alloc(samples))
}

/// Gaussian white noise, reproducible when `seed` is given.
///
/// ```
/// use sig_rs::signal::noise::white_noise;
///
/// let a = white_noise(256, 0.5, Some(42)).unwrap();
/// let b = white_noise(256, 0.5, Some(42)).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 256);
/// ```
pub fn white_noise(samples: usize, amplitude: f64, seed: Option<u32>) -> Result<Vec<f64>> {
    generate(
        samples,
        NoiseConfig {
            kind: NoiseKind::White,
            amplitude,
            seed,
        },
    )
}

/// Pink (1/f) noise, reproducible when `seed` is given.
pub fn pink_noise(samples: usize, amplitude: f64, seed: Option<u32>) -> Result<Vec<f64>> {
    generate(
        samples,
        NoiseConfig {
            kind: NoiseKind::Pink,
            amplitude,
            seed,
        },
    )
}

/// Brown (random-walk) noise, reproducible when `seed` is given.
pub fn brown_noise(samples: usize, amplitude: f64, seed: Option<u32>) -> Result<Vec<f64>> {
    generate(
        samples,
        NoiseConfig {
            kind: NoiseKind::Brown,
            amplitude,
            seed,
        },
    )
}

/// Add a freshly generated noise sequence to `signal`.
///
/// ```
/// use sig_rs::signal::noise::{add_noise, NoiseConfig, NoiseKind};
///
/// let clean = vec![1.0; 8];
/// let silent = add_noise(&clean, &NoiseConfig::new(NoiseKind::Brown, 0.0)).unwrap();
/// assert_eq!(silent, clean);
/// ```
pub fn add_noise(signal: &[f64], config: &NoiseConfig) -> Result<Vec<f64>> {
    Ok(NoiseKernel::try_new(*config)?.run_add(signal)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mean_and_variance(x: &[f64]) -> (f64, f64) {
        let n = x.len() as f64;
        let mean = x.iter().sum::<f64>() / n;
        let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        (mean, var)
    }

    #[test]
    fn lcg_uniforms_match_recurrence() {
        let mut lcg = Lcg::new(12345);
        let expected_state = 12345u64 * 1_664_525 + 1_013_904_223;
        let draw = uniform(&mut lcg);
        assert_eq!(u64::from(lcg.state()), expected_state % (1u64 << 32));
        assert_abs_diff_eq!(draw, lcg.state() as f64 / TWO_POW_32);
        assert!((0.0..1.0).contains(&draw));
    }

    #[test]
    fn white_noise_is_roughly_standard_normal() {
        let x = white_noise(20_000, 1.0, Some(7)).expect("white noise");
        let (mean, var) = mean_and_variance(&x);
        assert_abs_diff_eq!(mean, 0.0, epsilon = 0.05);
        assert_abs_diff_eq!(var, 1.0, epsilon = 0.05);
    }

    #[test]
    fn different_seeds_differ() {
        let a = white_noise(32, 1.0, Some(1)).expect("a");
        let b = white_noise(32, 1.0, Some(2)).expect("b");
        assert_ne!(a, b);
    }

    #[test]
    fn unseeded_noise_has_requested_length() {
        let x = pink_noise(100, 1.0, None).expect("pink");
        assert_eq!(x.len(), 100);
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn pink_noise_is_bounded_by_amplitude() {
        let x = pink_noise(4096, 2.0, Some(3)).expect("pink");
        assert!(x.iter().all(|v| v.abs() <= 2.0));
    }

    #[test]
    fn brown_noise_steps_are_small() {
        let x = brown_noise(1000, 1.0, Some(11)).expect("brown");
        assert!(x[0].abs() <= 0.05);
        assert!(x
            .windows(2)
            .all(|w| (w[1] - w[0]).abs() <= BROWN_STEP / 2.0 + 1e-12));
    }

    #[test]
    fn seeded_add_noise_matches_generated_noise() {
        let signal: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let config = NoiseConfig::new(NoiseKind::White, 0.1).with_seed(99);
        let noisy = add_noise(&signal, &config).expect("add noise");
        let noise = white_noise(64, 0.1, Some(99)).expect("noise");
        noisy
            .iter()
            .zip(signal.iter().zip(noise.iter()))
            .for_each(|(y, (x, n))| assert_abs_diff_eq!(*y, x + n, epsilon = 1e-12));
    }

    #[test]
    fn non_finite_amplitude_is_rejected() {
        assert!(white_noise(8, f64::NAN, None).is_err());
    }
}
