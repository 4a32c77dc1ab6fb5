use crate::kernel::KernelLifecycle;
use crate::signal::traits::Generate1D;
use crate::Result;
use ndarray::Array1;
use tracing::trace;

mod kernels;
pub use kernels::*;

/// Largest number of samples a generator emits.
pub const MAX_SAMPLES: usize = u32::MAX as usize;

/// Sampling grid and shape parameters shared by all deterministic waveforms.
///
/// A generator produces `round(sample_rate * duration)` samples at
/// `t = i / sample_rate`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalConfig {
    /// Samples per second. Must be finite and positive.
    pub sample_rate: f64,
    /// Capture length in seconds. Must be finite and non-negative.
    pub duration: f64,
    /// Peak amplitude.
    pub amplitude: f64,
    /// Fundamental frequency in Hz.
    pub frequency: f64,
    /// Phase offset in radians.
    pub phase: f64,
    /// DC offset added after scaling.
    pub offset: f64,
}

impl SignalConfig {
    /// Unit-amplitude 1 Hz configuration with zero phase and offset.
    pub fn new(sample_rate: f64, duration: f64) -> Self {
        Self {
            sample_rate,
            duration,
            amplitude: 1.0,
            frequency: 1.0,
            phase: 0.0,
            offset: 0.0,
        }
    }

    /// Set the amplitude.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Set the frequency in Hz.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the phase in radians.
    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    /// Set the DC offset.
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Number of samples a generator emits for this configuration, capped
    /// at [`MAX_SAMPLES`]. Kernels reject configurations beyond the cap.
    pub fn sample_count(&self) -> usize {
        (self.sample_rate * self.duration)
            .round()
            .clamp(0.0, MAX_SAMPLES as f64) as usize
    }
}

/// Sample instants `i / sample_rate` for `config`.
///
/// ```
/// use sig_rs::signal::wave::{time_axis, SignalConfig};
///
/// let t = time_axis(&SignalConfig::new(4.0, 1.0)).unwrap();
/// assert_eq!(t.to_vec(), vec![0.0, 0.25, 0.5, 0.75]);
/// ```
pub fn time_axis(config: &SignalConfig) -> Result<Array1<f64>> {
    kernels::validate_signal(config)?;
    Ok(Array1::from_shape_fn(config.sample_count(), |i| {
        i as f64 / config.sample_rate
    }))
}

fn generate(config: SignalConfig, shape: WaveShape) -> Result<Vec<f64>> {
    let kernel = WaveformKernel::try_new(WaveformConfig {
        signal: config,
        shape,
    })?;
    Ok(kernel.run_alloc()?)
}

/// `amplitude * sin(2πft + phase) + offset`.
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use sig_rs::signal::wave::{sine, SignalConfig};
///
/// let y = sine(SignalConfig::new(8.0, 1.0)).unwrap();
/// assert_eq!(y.len(), 8);
/// assert_abs_diff_eq!(y[2], 1.0, epsilon = 1e-12);
/// assert_abs_diff_eq!(y[6], -1.0, epsilon = 1e-12);
/// ```
pub fn sine(config: SignalConfig) -> Result<Vec<f64>> {
    generate(config, WaveShape::Sine)
}

/// `amplitude * cos(2πft + phase) + offset`.
pub fn cosine(config: SignalConfig) -> Result<Vec<f64>> {
    generate(config, WaveShape::Cosine)
}

/// `amplitude * sign(sin(2πft + phase)) + offset`, with `sign(0) = 0`.
///
/// ```
/// use sig_rs::signal::wave::{square, SignalConfig};
///
/// let y = square(SignalConfig::new(4.0, 1.0).with_phase(0.5)).unwrap();
/// assert_eq!(y, vec![1.0, 1.0, -1.0, -1.0]);
/// ```
pub fn square(config: SignalConfig) -> Result<Vec<f64>> {
    generate(config, WaveShape::Square)
}

/// Symmetric triangle rising from `-1` to `1` over the first half cycle.
///
/// ```
/// use sig_rs::signal::wave::{triangle, SignalConfig};
///
/// let y = triangle(SignalConfig::new(4.0, 1.0)).unwrap();
/// assert_eq!(y, vec![-1.0, 0.0, 1.0, 0.0]);
/// ```
pub fn triangle(config: SignalConfig) -> Result<Vec<f64>> {
    generate(config, WaveShape::Triangle)
}

/// Ramp from `-1` to `1` once per cycle.
///
/// ```
/// use sig_rs::signal::wave::{sawtooth, SignalConfig};
///
/// let y = sawtooth(SignalConfig::new(4.0, 1.0).with_amplitude(2.0)).unwrap();
/// assert_eq!(y, vec![-2.0, -1.0, 0.0, 1.0]);
/// ```
pub fn sawtooth(config: SignalConfig) -> Result<Vec<f64>> {
    generate(config, WaveShape::Sawtooth)
}

/// `+amplitude` for the first `duty_cycle` fraction of each cycle, `-amplitude` otherwise.
///
/// ```
/// use sig_rs::signal::wave::{pulse, SignalConfig};
///
/// let y = pulse(SignalConfig::new(4.0, 1.0), 0.25).unwrap();
/// assert_eq!(y, vec![1.0, -1.0, -1.0, -1.0]);
///
/// assert!(pulse(SignalConfig::new(4.0, 1.0), 1.5).is_err());
/// ```
pub fn pulse(config: SignalConfig, duty_cycle: f64) -> Result<Vec<f64>> {
    generate(config, WaveShape::Pulse { duty_cycle })
}

/// Swept-frequency sine.
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use sig_rs::signal::wave::{chirp, ChirpConfig, ChirpMethod, SignalConfig};
///
/// let y = chirp(ChirpConfig {
///     signal: SignalConfig::new(1000.0, 1.0),
///     start_frequency: 10.0,
///     end_frequency: 100.0,
///     method: ChirpMethod::Linear,
/// })
/// .unwrap();
/// assert_eq!(y.len(), 1000);
/// assert_abs_diff_eq!(y[0], 0.0);
/// ```
pub fn chirp(config: ChirpConfig) -> Result<Vec<f64>> {
    let kernel = ChirpKernel::try_new(config)?;
    Ok(kernel.run_alloc()?)
}

/// Elementwise sum of `signals`, truncated to the shortest input.
///
/// An empty set of signals yields an empty output.
///
/// ```
/// use sig_rs::signal::wave::composite;
///
/// let sum = composite(&[vec![1.0, 2.0, 3.0], vec![10.0, 20.0]]);
/// assert_eq!(sum, vec![11.0, 22.0]);
/// ```
pub fn composite<S>(signals: &[S]) -> Vec<f64>
where
    S: AsRef<[f64]>,
{
    let Some(len) = signals.iter().map(|s| s.as_ref().len()).min() else {
        trace!("composite of zero signals is empty");
        return Vec::new();
    };
    let mut out = vec![0.0; len];
    for signal in signals {
        out.iter_mut()
            .zip(signal.as_ref().iter())
            .for_each(|(acc, x)| *acc += x);
    }
    out
}
