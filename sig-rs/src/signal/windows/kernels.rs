//! Trait-first window generation kernels.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Write1D};
use crate::signal::traits::Generate1D;

use super::{fill_window, WindowType};

/// Constructor config for [`WindowKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowConfig {
    /// Window family and parameters.
    pub window: WindowType,
    /// Output length.
    pub len: usize,
}

/// Trait-first window generation kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowKernel {
    window: WindowType,
    len: usize,
}

impl WindowKernel {
    /// Return configured window family.
    pub fn window(&self) -> WindowType {
        self.window
    }
}

impl KernelLifecycle for WindowKernel {
    type Config = WindowConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if let WindowType::Kaiser { beta } = config.window {
            if !beta.is_finite() || beta < 0.0 {
                return Err(ConfigError::InvalidArgument {
                    arg: "beta",
                    reason: "beta must be finite and non-negative",
                });
            }
        }
        Ok(Self {
            window: config.window,
            len: config.len,
        })
    }
}

impl Generate1D<f64> for WindowKernel {
    fn output_len(&self) -> usize {
        self.len
    }

    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<f64> + ?Sized,
    {
        let out = out
            .write_slice_mut()
            .map_err(ExecInvariantViolation::from)?;
        if out.len() != self.len {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: self.len,
                got: out.len(),
            });
        }
        fill_window(self.window, out);
        Ok(())
    }

    fn run_alloc(&self) -> Result<Vec<f64>, ExecInvariantViolation> {
        let mut out = vec![0.0; self.len];
        self.run_into(out.as_mut_slice())?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{WindowConfig, WindowKernel};
    use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle};
    use crate::signal::traits::Generate1D;
    use crate::signal::windows::{get_window, WindowType};
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    #[test]
    fn window_kernel_alloc_matches_free_function() {
        let kernel = WindowKernel::try_new(WindowConfig {
            window: WindowType::Hamming,
            len: 17,
        })
        .expect("window kernel should initialize");

        let actual = kernel.run_alloc().expect("window run_alloc should succeed");
        let expected = get_window(WindowType::Hamming, 17);
        actual
            .iter()
            .zip(expected.iter())
            .for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 1e-12));
    }

    #[test]
    fn window_kernel_run_into_ndarray() {
        let kernel = WindowKernel::try_new(WindowConfig {
            window: WindowType::Rectangular,
            len: 8,
        })
        .expect("window kernel should initialize");

        let mut out = Array1::from(vec![0.0f64; 8]);
        kernel.run_into(&mut out).expect("run_into");
        assert!(out.iter().all(|w| *w == 1.0));

        let mut short = [0.0f64; 3];
        let err = kernel.run_into(&mut short).expect_err("length mismatch");
        assert_eq!(
            err,
            ExecInvariantViolation::LengthMismatch {
                arg: "out",
                expected: 8,
                got: 3
            }
        );
    }

    #[test]
    fn window_kernel_rejects_negative_beta() {
        let err = WindowKernel::try_new(WindowConfig {
            window: WindowType::Kaiser { beta: -1.0 },
            len: 8,
        })
        .expect_err("negative beta");
        assert!(matches!(err, ConfigError::InvalidArgument { arg: "beta", .. }));
    }

    #[test]
    fn single_sample_window_is_unity() {
        let kernel = WindowKernel::try_new(WindowConfig {
            window: WindowType::Blackman,
            len: 1,
        })
        .expect("window kernel should initialize");
        assert_eq!(kernel.run_alloc().expect("alloc"), vec![1.0]);
    }
}
