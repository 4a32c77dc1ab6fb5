//! Symmetric tapering windows.
//!
//! All windows use `N - 1` in the denominator so the first and last samples
//! mirror each other, as expected when tapering a finite capture before an
//! FFT. A window of length `1` is `[1.0]` and a window of length `0` is empty.

use crate::kernel::KernelLifecycle;
use crate::signal::traits::Generate1D;
use crate::special::bessel_i0;
use crate::Result;
use core::f64::consts::PI;
use tracing::trace;

mod kernels;
pub use kernels::*;

/// Shape parameter used by [`WindowType::KAISER`].
pub const KAISER_BETA: f64 = 5.0;

/// Window families supported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowType {
    /// No tapering, every coefficient is `1`.
    Rectangular,
    /// Raised cosine `0.5 - 0.5 cos(2πn/(N-1))`.
    #[default]
    Hanning,
    /// `0.54 - 0.46 cos(2πn/(N-1))`.
    Hamming,
    /// Three-term Blackman window.
    Blackman,
    /// Kaiser window.
    Kaiser {
        /// Shape parameter `beta`.
        beta: f64,
    },
}

impl WindowType {
    /// Kaiser window with the default `beta` of [`KAISER_BETA`].
    pub const KAISER: WindowType = WindowType::Kaiser { beta: KAISER_BETA };
}

/// Build a window of `len` samples.
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use sig_rs::signal::windows::{get_window, WindowType};
///
/// let w = get_window(WindowType::Hanning, 5);
/// let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
/// w.iter()
///     .zip(expected.iter())
///     .for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 1e-12));
///
/// assert_eq!(get_window(WindowType::Blackman, 1), vec![1.0]);
/// assert!(get_window(WindowType::Hamming, 0).is_empty());
/// ```
pub fn get_window(window: WindowType, len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => {
            trace!(?window, "single-sample window is [1.0]");
            vec![1.0]
        }
        _ => {
            let mut out = vec![0.0; len];
            fill_window(window, &mut out);
            out
        }
    }
}

/// Multiply `signal` by a window of the same length.
///
/// ```
/// use sig_rs::signal::windows::{apply_window, WindowType};
///
/// let tapered = apply_window(&[2.0, 2.0, 2.0], WindowType::Hanning);
/// assert_eq!(tapered[0], 0.0);
/// assert_eq!(tapered[1], 2.0);
/// ```
pub fn apply_window(signal: &[f64], window: WindowType) -> Vec<f64> {
    let w = get_window(window, signal.len());
    signal.iter().zip(w.iter()).map(|(x, w)| x * w).collect()
}

/// Hanning window of `len` samples.
pub fn hanning(len: usize) -> Vec<f64> {
    get_window(WindowType::Hanning, len)
}

/// Hamming window of `len` samples.
pub fn hamming(len: usize) -> Vec<f64> {
    get_window(WindowType::Hamming, len)
}

/// Blackman window of `len` samples.
pub fn blackman(len: usize) -> Vec<f64> {
    get_window(WindowType::Blackman, len)
}

/// Kaiser window of `len` samples with shape parameter `beta`.
///
/// # Errors
/// `beta` negative or not finite.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::signal::windows::{kaiser, KAISER_BETA};
///
/// let w = kaiser(9, KAISER_BETA).unwrap();
/// assert_relative_eq!(w[4], 1.0);
/// assert_relative_eq!(w[0], w[8]);
/// assert!(w[0] < 0.05);
///
/// assert!(kaiser(9, -1.0).is_err());
/// ```
pub fn kaiser(len: usize, beta: f64) -> Result<Vec<f64>> {
    let kernel = WindowKernel::try_new(WindowConfig {
        window: WindowType::Kaiser { beta },
        len,
    })?;
    Ok(kernel.run_alloc()?)
}

/// Fill `out` (length >= 2) with the window coefficients.
pub(crate) fn fill_window(window: WindowType, out: &mut [f64]) {
    let len = out.len();
    if len < 2 {
        out.fill(1.0);
        return;
    }
    let denom = (len - 1) as f64;
    match window {
        WindowType::Rectangular => out.fill(1.0),
        WindowType::Hanning => out.iter_mut().enumerate().for_each(|(i, w)| {
            *w = 0.5 - 0.5 * (2.0 * PI * i as f64 / denom).cos();
        }),
        WindowType::Hamming => out.iter_mut().enumerate().for_each(|(i, w)| {
            *w = 0.54 - 0.46 * (2.0 * PI * i as f64 / denom).cos();
        }),
        WindowType::Blackman => out.iter_mut().enumerate().for_each(|(i, w)| {
            let phase = 2.0 * PI * i as f64 / denom;
            *w = 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos();
        }),
        WindowType::Kaiser { beta } => {
            let alpha = denom / 2.0;
            let norm = bessel_i0(beta);
            out.iter_mut().enumerate().for_each(|(i, w)| {
                let x = (i as f64 - alpha) / alpha;
                // Rounding can push 1 - x² a hair below zero at the edges.
                let arg = (1.0 - x * x).max(0.0);
                *w = bessel_i0(beta * arg.sqrt()) / norm;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn windows_are_symmetric() {
        for window in [
            WindowType::Hanning,
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::KAISER,
        ] {
            let w = get_window(window, 16);
            for i in 0..8 {
                assert_abs_diff_eq!(w[i], w[15 - i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn hamming_and_blackman_endpoints() {
        let w = hamming(11);
        assert_abs_diff_eq!(w[0], 0.08, epsilon = 1e-12);
        assert_abs_diff_eq!(w[5], 1.0, epsilon = 1e-12);

        let w = blackman(11);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[5], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn kaiser_matches_numpy_reference() {
        // numpy.kaiser(7, 5)
        let expected = [
            0.036_710_892_271_286_68,
            0.328_201_957_372_321,
            0.775_322_104_445_407,
            1.0,
            0.775_322_104_445_407,
            0.328_201_957_372_321,
            0.036_710_892_271_286_68,
        ];
        let w = kaiser(7, KAISER_BETA).expect("kaiser");
        w.iter()
            .zip(expected.iter())
            .for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 1e-9));
    }

    #[test]
    fn kaiser_rejects_bad_beta() {
        for beta in [-0.5, f64::NAN, f64::INFINITY] {
            let err = kaiser(8, beta).expect_err("invalid beta");
            assert!(matches!(err, sig_rs_core::Error::InvalidArg { ref arg, .. } if arg == "beta"));
        }
        assert_eq!(kaiser(1, 0.0).expect("beta 0"), vec![1.0]);
    }

    #[test]
    fn rectangular_is_identity() {
        let x = [1.0, -2.0, 3.0];
        assert_eq!(apply_window(&x, WindowType::Rectangular), x.to_vec());
    }
}
