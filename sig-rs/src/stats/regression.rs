use crate::{Error, Result};
use tracing::trace;

use super::descriptive::mean;

/// Ordinary least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegressionResult {
    /// Fitted slope.
    pub slope: f64,
    /// Fitted intercept.
    pub intercept: f64,
    /// Square of [`RegressionResult::correlation`].
    pub r_squared: f64,
    /// Pearson correlation of the inputs.
    pub correlation: f64,
    /// Human readable fit, `y = {slope:.4}x + {intercept:.4}`.
    pub equation: String,
    /// Fitted value at every `x`.
    pub predicted_values: Vec<f64>,
    /// `y - predicted` at every point.
    pub residuals: Vec<f64>,
}

fn ensure_paired(x: &[f64], y: &[f64]) -> Result<()> {
    if x.is_empty() {
        return Err(Error::EmptyInput { arg: "x".into() });
    }
    if x.len() != y.len() {
        return Err(Error::LengthMismatch {
            arg: "y".into(),
            expected: x.len(),
            got: y.len(),
        });
    }
    Ok(())
}

/// Least squares line through `(x, y)`.
///
/// When every `x` is equal the slope is undefined and the fit degenerates to
/// the horizontal line through the mean of `y`.
///
/// ```
/// use sig_rs::stats::linear_regression;
///
/// let fit = linear_regression(&[0.0, 1.0, 2.0, 3.0], &[5.0, 7.0, 9.0, 11.0]).unwrap();
/// assert_eq!(fit.slope, 2.0);
/// assert_eq!(fit.intercept, 5.0);
/// assert_eq!(fit.correlation, 1.0);
/// assert_eq!(fit.r_squared, 1.0);
/// assert_eq!(fit.equation, "y = 2.0000x + 5.0000");
/// ```
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<RegressionResult> {
    ensure_paired(x, y)?;
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_xx: f64 = x.iter().map(|a| a * a).sum();
    let sum_yy: f64 = y.iter().map(|b| b * b).sum();

    let sxx = n * sum_xx - sum_x * sum_x;
    let syy = n * sum_yy - sum_y * sum_y;
    let sxy = n * sum_xy - sum_x * sum_y;

    let slope = if sxx == 0.0 {
        trace!("x has no spread, fitting a horizontal line");
        0.0
    } else {
        sxy / sxx
    };
    let intercept = (sum_y - slope * sum_x) / n;
    let denominator = (sxx * syy).sqrt();
    let correlation = if denominator == 0.0 {
        0.0
    } else {
        sxy / denominator
    };

    let predicted_values: Vec<f64> = x.iter().map(|xi| slope * xi + intercept).collect();
    let residuals = y
        .iter()
        .zip(predicted_values.iter())
        .map(|(yi, pi)| yi - pi)
        .collect();

    Ok(RegressionResult {
        slope,
        intercept,
        r_squared: correlation * correlation,
        correlation,
        equation: format!("y = {slope:.4}x + {intercept:.4}"),
        predicted_values,
        residuals,
    })
}

/// Pearson correlation, `0` when either input has no variance.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::stats::correlation;
///
/// assert_relative_eq!(correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap(), -1.0);
/// assert_eq!(correlation(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap(), 0.0);
/// ```
pub fn correlation(x: &[f64], y: &[f64]) -> Result<f64> {
    ensure_paired(x, y)?;
    let (mean_x, _): (f64, _) = mean(x.iter());
    let (mean_y, _): (f64, _) = mean(y.iter());

    let (num, sxx, syy) = x
        .iter()
        .zip(y)
        .fold((0.0f64, 0.0f64, 0.0f64), |(num, sxx, syy), (a, b)| {
            let (dx, dy) = (a - mean_x, b - mean_y);
            (num + dx * dy, sxx + dx * dx, syy + dy * dy)
        });
    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 {
        trace!("zero variance input, correlation reported as 0");
        return Ok(0.0);
    }
    Ok(num / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn residuals_sum_to_zero() {
        let x = [1.0, 2.0, 4.0, 5.0, 8.0];
        let y = [2.1, 3.9, 8.2, 9.8, 16.5];
        let fit = linear_regression(&x, &y).expect("fit");
        assert_relative_eq!(fit.residuals.iter().sum::<f64>(), 0.0, epsilon = 1e-9);
        assert!(fit.r_squared > 0.99 && fit.r_squared <= 1.0);
        assert_relative_eq!(fit.correlation, correlation(&x, &y).expect("r"), epsilon = 1e-9);
    }

    #[test]
    fn vertical_data_fits_mean_of_y() {
        let fit = linear_regression(&[3.0, 3.0, 3.0], &[1.0, 2.0, 6.0]).expect("fit");
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 3.0);
        assert_eq!(fit.correlation, 0.0);
        assert_eq!(fit.equation, "y = 0.0000x + 3.0000");
    }

    #[test]
    fn negative_intercept_keeps_plus_sign() {
        let fit = linear_regression(&[0.0, 1.0], &[-1.5, 0.5]).expect("fit");
        assert_eq!(fit.equation, "y = 2.0000x + -1.5000");
    }

    #[test]
    fn mismatched_or_empty_inputs_fail() {
        assert_eq!(
            linear_regression(&[1.0, 2.0], &[1.0]).expect_err("mismatch"),
            Error::LengthMismatch {
                arg: "y".into(),
                expected: 2,
                got: 1
            }
        );
        assert!(linear_regression(&[], &[]).is_err());
        assert!(correlation(&[], &[]).is_err());
    }
}
