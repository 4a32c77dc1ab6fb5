//! Trait-first kernels for waveform generation.

use crate::kernel::{
    ensure_finite, ensure_positive, ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D,
};
use crate::signal::traits::Generate1D;
use core::f64::consts::PI;

use super::{SignalConfig, MAX_SAMPLES};

/// Periodic waveform families.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaveShape {
    /// `sin(2πft + φ)`.
    Sine,
    /// `cos(2πft + φ)`.
    Cosine,
    /// Sign of the sine.
    Square,
    /// Symmetric triangle.
    Triangle,
    /// Rising ramp.
    Sawtooth,
    /// Rectangular pulse train.
    Pulse {
        /// Fraction of each cycle spent high, in `[0, 1]`.
        duty_cycle: f64,
    },
}

pub(crate) fn validate_signal(config: &SignalConfig) -> Result<(), ConfigError> {
    ensure_positive("sample_rate", config.sample_rate)?;
    ensure_finite("duration", config.duration)?;
    if config.duration < 0.0 {
        return Err(ConfigError::InvalidArgument {
            arg: "duration",
            reason: "duration must be non-negative",
        });
    }
    if (config.sample_rate * config.duration).round() > MAX_SAMPLES as f64 {
        return Err(ConfigError::InvalidArgument {
            arg: "duration",
            reason: "sample_rate * duration exceeds the sample limit",
        });
    }
    ensure_finite("amplitude", config.amplitude)?;
    ensure_finite("frequency", config.frequency)?;
    ensure_finite("phase", config.phase)?;
    ensure_finite("offset", config.offset)
}

fn bind_output<'a, O>(out: &'a mut O, len: usize) -> Result<&'a mut [f64], ExecInvariantViolation>
where
    O: Write1D<f64> + ?Sized,
{
    let out = out
        .write_slice_mut()
        .map_err(ExecInvariantViolation::from)?;
    if out.len() != len {
        return Err(ExecInvariantViolation::LengthMismatch {
            arg: "out",
            expected: len,
            got: out.len(),
        });
    }
    Ok(out)
}

/// Constructor config for [`WaveformKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WaveformConfig {
    /// Sampling grid, amplitude, frequency, phase and offset.
    pub signal: SignalConfig,
    /// Waveform family.
    pub shape: WaveShape,
}

/// Trait-first periodic waveform generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformKernel {
    signal: SignalConfig,
    shape: WaveShape,
}

impl WaveformKernel {
    /// Return configured waveform family.
    pub fn shape(&self) -> WaveShape {
        self.shape
    }

    /// Position within the current cycle, always in `[0, 1)`.
    fn cycle_position(&self, t: f64) -> f64 {
        (self.signal.frequency * t + self.signal.phase / (2.0 * PI)).rem_euclid(1.0)
    }

    pub(super) fn sample(&self, t: f64) -> f64 {
        let s = &self.signal;
        let arg = 2.0 * PI * s.frequency * t + s.phase;
        let unit = match self.shape {
            WaveShape::Sine => arg.sin(),
            WaveShape::Cosine => arg.cos(),
            WaveShape::Square => {
                let v = arg.sin();
                if v > 0.0 {
                    1.0
                } else if v < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            WaveShape::Triangle => {
                let u = self.cycle_position(t);
                if u < 0.5 {
                    4.0 * u - 1.0
                } else {
                    3.0 - 4.0 * u
                }
            }
            WaveShape::Sawtooth => 2.0 * self.cycle_position(t) - 1.0,
            WaveShape::Pulse { duty_cycle } => {
                if self.cycle_position(t) < duty_cycle {
                    1.0
                } else {
                    -1.0
                }
            }
        };
        s.amplitude * unit + s.offset
    }
}

impl KernelLifecycle for WaveformKernel {
    type Config = WaveformConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_signal(&config.signal)?;
        if let WaveShape::Pulse { duty_cycle } = config.shape {
            if !(0.0..=1.0).contains(&duty_cycle) {
                return Err(ConfigError::InvalidArgument {
                    arg: "duty_cycle",
                    reason: "duty_cycle must be in [0, 1]",
                });
            }
        }
        Ok(Self {
            signal: config.signal,
            shape: config.shape,
        })
    }
}

impl Generate1D<f64> for WaveformKernel {
    fn output_len(&self) -> usize {
        self.signal.sample_count()
    }

    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let out = bind_output(out, self.output_len())?;
        let fs = self.signal.sample_rate;
        out.iter_mut()
            .enumerate()
            .for_each(|(i, y)| *y = self.sample(i as f64 / fs));
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<f64>, ExecInvariantViolation> {
        let fs = self.signal.sample_rate;
        Ok((0..self.output_len())
            .map(|i| self.sample(i as f64 / fs))
            .collect())
    }
}

/// Frequency trajectory of a chirp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChirpMethod {
    /// Instantaneous frequency moves linearly from start to end.
    #[default]
    Linear,
    /// Instantaneous frequency moves geometrically from start to end.
    Logarithmic,
}

/// Constructor config for [`ChirpKernel`].
///
/// `signal.frequency` is ignored, the sweep runs from `start_frequency` at
/// `t = 0` to `end_frequency` at `t = signal.duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChirpConfig {
    /// Sampling grid, amplitude, phase and offset.
    pub signal: SignalConfig,
    /// Frequency at `t = 0`, in Hz.
    pub start_frequency: f64,
    /// Frequency at `t = duration`, in Hz.
    pub end_frequency: f64,
    /// Sweep trajectory.
    pub method: ChirpMethod,
}

/// Trait-first chirp generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChirpKernel {
    config: ChirpConfig,
}

impl ChirpKernel {
    /// Instantaneous phase in radians at time `t`, excluding the configured phase offset.
    pub fn phase_at(&self, t: f64) -> f64 {
        let f0 = self.config.start_frequency;
        let f1 = self.config.end_frequency;
        let duration = self.config.signal.duration;
        match self.config.method {
            ChirpMethod::Linear => 2.0 * PI * (f0 * t + 0.5 * (f1 - f0) * t * t / duration),
            ChirpMethod::Logarithmic => {
                let ratio = f1 / f0;
                if ratio == 1.0 {
                    2.0 * PI * f0 * t
                } else {
                    2.0 * PI * f0 * duration * (ratio.powf(t / duration) - 1.0) / ratio.ln()
                }
            }
        }
    }

    fn sample(&self, t: f64) -> f64 {
        let s = &self.config.signal;
        s.amplitude * (self.phase_at(t) + s.phase).sin() + s.offset
    }
}

impl KernelLifecycle for ChirpKernel {
    type Config = ChirpConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_signal(&config.signal)?;
        ensure_finite("start_frequency", config.start_frequency)?;
        ensure_finite("end_frequency", config.end_frequency)?;
        if config.method == ChirpMethod::Logarithmic {
            ensure_positive("start_frequency", config.start_frequency)?;
            ensure_positive("end_frequency", config.end_frequency)?;
        }
        Ok(Self { config })
    }
}

impl Generate1D<f64> for ChirpKernel {
    fn output_len(&self) -> usize {
        self.config.signal.sample_count()
    }

    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let out = bind_output(out, self.output_len())?;
        let fs = self.config.signal.sample_rate;
        out.iter_mut()
            .enumerate()
            .for_each(|(i, y)| *y = self.sample(i as f64 / fs));
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<f64>, ExecInvariantViolation> {
        let mut out = vec![0.0; self.output_len()];
        self.run_into(out.as_mut_slice())?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    fn chirp_kernel(method: ChirpMethod, f0: f64, f1: f64) -> ChirpKernel {
        ChirpKernel::try_new(ChirpConfig {
            signal: SignalConfig::new(1000.0, 2.0),
            start_frequency: f0,
            end_frequency: f1,
            method,
        })
        .expect("chirp kernel")
    }

    /// Instantaneous frequency by central difference of the phase.
    fn inst_freq(kernel: &ChirpKernel, t: f64) -> f64 {
        let h = 1e-6;
        (kernel.phase_at(t + h) - kernel.phase_at(t - h)) / (2.0 * h) / (2.0 * PI)
    }

    #[test]
    fn linear_chirp_sweeps_between_endpoints() {
        let kernel = chirp_kernel(ChirpMethod::Linear, 10.0, 50.0);
        assert_relative_eq!(inst_freq(&kernel, 1e-3), 10.02, epsilon = 1e-4);
        assert_relative_eq!(inst_freq(&kernel, 1.0), 30.0, epsilon = 1e-4);
        assert_relative_eq!(inst_freq(&kernel, 2.0 - 1e-3), 49.98, epsilon = 1e-4);
    }

    #[test]
    fn logarithmic_chirp_is_geometric() {
        let kernel = chirp_kernel(ChirpMethod::Logarithmic, 10.0, 1000.0);
        assert_relative_eq!(inst_freq(&kernel, 1.0), 100.0, epsilon = 1e-3);
    }

    #[test]
    fn logarithmic_chirp_with_equal_endpoints_is_a_tone() {
        let kernel = chirp_kernel(ChirpMethod::Logarithmic, 25.0, 25.0);
        assert_relative_eq!(kernel.phase_at(0.5), 2.0 * PI * 12.5, epsilon = 1e-12);
    }

    #[test]
    fn logarithmic_chirp_rejects_non_positive_frequency() {
        let err = ChirpKernel::try_new(ChirpConfig {
            signal: SignalConfig::new(1000.0, 1.0),
            start_frequency: 0.0,
            end_frequency: 100.0,
            method: ChirpMethod::Logarithmic,
        })
        .expect_err("zero start frequency");
        assert!(matches!(
            err,
            ConfigError::InvalidArgument {
                arg: "start_frequency",
                ..
            }
        ));
    }

    #[test]
    fn waveform_kernel_run_into_matches_alloc() {
        let kernel = WaveformKernel::try_new(WaveformConfig {
            signal: SignalConfig::new(50.0, 0.4).with_frequency(3.0),
            shape: WaveShape::Triangle,
        })
        .expect("waveform kernel");
        let alloc = kernel.run_alloc().expect("alloc");
        let mut out = Array1::zeros(alloc.len());
        kernel.run_into(&mut out).expect("run_into");
        assert_eq!(out.to_vec(), alloc);
        assert_eq!(kernel.shape(), WaveShape::Triangle);
    }

    #[test]
    fn waveform_kernel_validates_output_length() {
        let kernel = WaveformKernel::try_new(WaveformConfig {
            signal: SignalConfig::new(10.0, 1.0),
            shape: WaveShape::Sine,
        })
        .expect("waveform kernel");
        let mut out = [0.0; 4];
        let err = kernel.run_into(&mut out).expect_err("short buffer");
        assert!(matches!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 10,
                got: 4
            }
        ));
    }
}
