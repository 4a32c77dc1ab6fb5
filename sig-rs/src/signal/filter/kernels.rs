//! Trait-first kernels for stateless smoothing.

use crate::kernel::{
    ensure_positive, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};
use crate::signal::traits::Smooth1D;
use ndarray::ArrayView1;
use sig_rs_core::num_rs::convolve_same_replicate;

use super::savgol::least_squares_weights;

/// Smoothing algorithm and its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SmoothingMethod {
    /// Centred mean, windows shrink at the edges.
    MovingAverage {
        /// Window length, at least one.
        window: usize,
    },
    /// Centred median, even windows are widened by one.
    Median {
        /// Window length.
        window: usize,
    },
    /// Normalized Gaussian taps, edge samples repeated.
    Gaussian {
        /// Standard deviation in samples.
        sigma: f64,
        /// Tap count, defaulting to `⌈6σ⌉`. Even counts are widened by one.
        size: Option<usize>,
    },
    /// Least-squares polynomial smoothing, edge samples repeated.
    SavitzkyGolay {
        /// Window length, even windows are widened by one.
        window: usize,
        /// Polynomial degree, less than the window.
        polyorder: usize,
    },
}

/// Constructor config for [`SmoothingKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmoothingConfig {
    /// Algorithm to run.
    pub method: SmoothingMethod,
}

/// Trait-first smoothing kernel.
///
/// Convolution taps are derived once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingKernel {
    method: SmoothingMethod,
    taps: Vec<f64>,
}

/// Upper bound on derived convolution taps.
const MAX_TAPS: usize = 1 << 24;

fn gaussian_taps(sigma: f64, size: usize) -> Vec<f64> {
    let center = (size / 2) as f64;
    let raw: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / total).collect()
}

impl SmoothingKernel {
    /// Effective method, with window sizes already widened to odd lengths.
    pub fn method(&self) -> SmoothingMethod {
        self.method
    }

    /// Convolution taps, empty for the order-statistic methods.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    fn smooth(&self, input: &[f64], out: &mut [f64]) -> Result<(), ExecInvariantViolation> {
        if input.is_empty() {
            return Ok(());
        }
        let n = input.len();
        match self.method {
            SmoothingMethod::MovingAverage { window } => {
                let (before, after) = (window / 2, window.div_ceil(2));
                out.iter_mut().enumerate().for_each(|(i, y)| {
                    let span = &input[i.saturating_sub(before)..(i + after).min(n)];
                    *y = span.iter().sum::<f64>() / span.len() as f64;
                });
            }
            SmoothingMethod::Median { window } => {
                let half = window / 2;
                let mut scratch = Vec::with_capacity(window);
                for (i, y) in out.iter_mut().enumerate() {
                    scratch.clear();
                    scratch.extend_from_slice(&input[i.saturating_sub(half)..(i + half + 1).min(n)]);
                    let mid = scratch.len() / 2;
                    *y = *scratch.select_nth_unstable_by(mid, f64::total_cmp).1;
                }
            }
            SmoothingMethod::Gaussian { .. } | SmoothingMethod::SavitzkyGolay { .. } => {
                // correlate by convolving with the reversed taps
                let reversed: Vec<f64> = self.taps.iter().rev().copied().collect();
                let y = convolve_same_replicate(
                    ArrayView1::from(input),
                    ArrayView1::from(reversed.as_slice()),
                )
                .map_err(|_| ExecInvariantViolation::InvalidState {
                    reason: "smoothing convolution rejected its operands",
                })?;
                out.iter_mut().zip(y.iter()).for_each(|(o, v)| *o = *v);
            }
        }
        Ok(())
    }
}

impl KernelLifecycle for SmoothingKernel {
    type Config = SmoothingConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        let (method, taps) = match config.method {
            SmoothingMethod::MovingAverage { window } => {
                if window == 0 {
                    return Err(ConfigError::InvalidArgument {
                        arg: "window",
                        reason: "window must be at least one sample",
                    });
                }
                (config.method, Vec::new())
            }
            SmoothingMethod::Median { window } => {
                (SmoothingMethod::Median { window: window | 1 }, Vec::new())
            }
            SmoothingMethod::Gaussian { sigma, size } => {
                ensure_positive("sigma", sigma)?;
                let size = match size {
                    Some(0) => {
                        return Err(ConfigError::InvalidArgument {
                            arg: "size",
                            reason: "size must be at least one tap",
                        })
                    }
                    Some(size) if size > MAX_TAPS => {
                        return Err(ConfigError::InvalidArgument {
                            arg: "size",
                            reason: "size exceeds the supported tap count",
                        })
                    }
                    Some(size) => size,
                    None => {
                        let size = (6.0 * sigma).ceil();
                        if size > MAX_TAPS as f64 {
                            return Err(ConfigError::InvalidArgument {
                                arg: "sigma",
                                reason: "sigma implies more taps than supported",
                            });
                        }
                        size as usize
                    }
                };
                let size = size | 1;
                (
                    SmoothingMethod::Gaussian {
                        sigma,
                        size: Some(size),
                    },
                    gaussian_taps(sigma, size),
                )
            }
            SmoothingMethod::SavitzkyGolay { window, polyorder } => {
                let window = window | 1;
                (
                    SmoothingMethod::SavitzkyGolay { window, polyorder },
                    least_squares_weights(window, polyorder)?,
                )
            }
        };
        Ok(Self { method, taps })
    }
}

impl Smooth1D<f64> for SmoothingKernel {
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != input.len() {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: input.len(),
                got: out.len(),
            });
        }
        self.smooth(input, out)
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut out = vec![0.0; input.len()];
        self.smooth(input, &mut out)?;
        Ok(out)
    }
}
