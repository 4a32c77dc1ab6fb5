//! Stateless smoothing filters.
//!
//! Every function here returns a sequence of the input's length and maps an
//! empty input to an empty output.

use crate::kernel::KernelLifecycle;
use crate::signal::traits::Smooth1D;
use crate::Result;

use super::kernels::{SmoothingConfig, SmoothingKernel, SmoothingMethod};

fn smooth(data: &[f64], method: SmoothingMethod) -> Result<Vec<f64>> {
    let kernel = SmoothingKernel::try_new(SmoothingConfig { method })?;
    Ok(kernel.run_alloc(data)?)
}

/// Centred moving average. Near the edges the window shrinks to the samples
/// that exist.
///
/// ```
/// use sig_rs::signal::filter::moving_average;
///
/// let y = moving_average(&[3.0, 6.0, 9.0, 12.0], 3).unwrap();
/// assert_eq!(y, vec![4.5, 6.0, 9.0, 10.5]);
/// ```
pub fn moving_average(data: &[f64], window: usize) -> Result<Vec<f64>> {
    smooth(data, SmoothingMethod::MovingAverage { window })
}

/// Centred running median. An even `window` is widened by one.
///
/// ```
/// use sig_rs::signal::filter::median_filter;
///
/// let y = median_filter(&[1.0, 1.0, 50.0, 1.0, 1.0], 3).unwrap();
/// assert_eq!(y, vec![1.0; 5]);
/// ```
pub fn median_filter(data: &[f64], window: usize) -> Result<Vec<f64>> {
    smooth(data, SmoothingMethod::Median { window })
}

/// Gaussian smoothing with `⌈6σ⌉` taps unless `size` is given.
pub fn gaussian_filter(data: &[f64], sigma: f64, size: Option<usize>) -> Result<Vec<f64>> {
    smooth(data, SmoothingMethod::Gaussian { sigma, size })
}

/// Savitzky–Golay smoothing. An even `window` is widened by one.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::signal::filter::savitzky_golay;
///
/// // a quadratic survives a quadratic fit away from the edges
/// let x: Vec<f64> = (0..12).map(|i| (i as f64).powi(2) - 3.0 * i as f64).collect();
/// let y = savitzky_golay(&x, 5, 2).unwrap();
/// for i in 2..10 {
///     assert_relative_eq!(y[i], x[i], epsilon = 1e-9);
/// }
/// ```
pub fn savitzky_golay(data: &[f64], window: usize, polyorder: usize) -> Result<Vec<f64>> {
    smooth(data, SmoothingMethod::SavitzkyGolay { window, polyorder })
}
