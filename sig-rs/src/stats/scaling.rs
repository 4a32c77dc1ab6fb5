use crate::kernel::KernelLifecycle;
use crate::{Error, Result};
use itertools::Itertools;
use tracing::trace;

use super::descriptive::{mean, percentile_sorted, sorted_copy, variance};
use super::kernels::{
    OutlierConfig, OutlierKernel, OutlierReport1D, StatsConfig, ZScoreKernel, ZScoreNormalize1D,
};

/// Samples outside the interquartile fence.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlierReport {
    /// Positions of the outliers in the input.
    pub outlier_indices: Vec<usize>,
    /// Outlier values, in input order.
    pub outlier_values: Vec<f64>,
    /// `q1 - factor * iqr`.
    pub lower_bound: f64,
    /// `q3 + factor * iqr`.
    pub upper_bound: f64,
}

/// Flag samples outside `[q1 - factor * iqr, q3 + factor * iqr]`.
///
/// ```
/// use sig_rs::stats::detect_outliers;
///
/// let report = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], 1.5).unwrap();
/// assert_eq!(report.outlier_indices, vec![5]);
/// assert_eq!(report.outlier_values, vec![100.0]);
/// ```
pub fn detect_outliers(data: &[f64], factor: f64) -> Result<OutlierReport> {
    let kernel = OutlierKernel::try_new(OutlierConfig { factor })?;
    Ok(kernel.run(data)?)
}

/// IQR fence over non-empty `data`.
pub(crate) fn fence(data: &[f64], factor: f64) -> OutlierReport {
    let sorted = sorted_copy(data);
    let q1 = percentile_sorted(&sorted, 25.0);
    let q3 = percentile_sorted(&sorted, 75.0);
    let iqr = q3 - q1;
    let (lower_bound, upper_bound) = (q1 - factor * iqr, q3 + factor * iqr);

    let (outlier_indices, outlier_values) = data
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v < lower_bound || v > upper_bound)
        .map(|(i, &v)| (i, v))
        .unzip();
    OutlierReport {
        outlier_indices,
        outlier_values,
        lower_bound,
        upper_bound,
    }
}

/// Z-scores using the population standard deviation.
///
/// A sample with no spread maps to all zeros.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::stats::normalize;
///
/// let z = normalize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_relative_eq!(z[0], -2f64.sqrt(), epsilon = 1e-12);
/// assert_relative_eq!(z[2], 0.0);
/// assert_eq!(normalize(&[7.0, 7.0]).unwrap(), vec![0.0, 0.0]);
/// ```
pub fn normalize(data: &[f64]) -> Result<Vec<f64>> {
    let kernel = ZScoreKernel::try_new(StatsConfig)?;
    Ok(kernel.run_alloc(data)?)
}

/// Write the z-scores of non-empty `data` into `out`.
pub(crate) fn zscores_into(data: &[f64], out: &mut [f64]) {
    let (avg, _): (f64, _) = mean(data.iter());
    let sd = variance::<_, f64>(data.iter()).0.sqrt();
    if sd == 0.0 {
        trace!("zero variance input, z-scores are all 0");
        out.iter_mut().for_each(|z| *z = 0.0);
        return;
    }
    out.iter_mut()
        .zip(data.iter())
        .for_each(|(z, x)| *z = (x - avg) / sd);
}

/// Affine map of the data range onto `[min, max]`.
///
/// A constant input maps to the midpoint of the target range.
///
/// ```
/// use sig_rs::stats::min_max_scale;
///
/// assert_eq!(min_max_scale(&[2.0, 4.0, 6.0], 0.0, 1.0).unwrap(), vec![0.0, 0.5, 1.0]);
/// assert_eq!(min_max_scale(&[3.0, 3.0], -1.0, 2.0).unwrap(), vec![0.5, 0.5]);
/// ```
pub fn min_max_scale(data: &[f64], min: f64, max: f64) -> Result<Vec<f64>> {
    let (lo, hi) = data
        .iter()
        .copied()
        .minmax_by(f64::total_cmp)
        .into_option()
        .ok_or(Error::EmptyInput { arg: "data".into() })?;
    let range = hi - lo;
    if range == 0.0 {
        trace!("zero range input, scaling to the midpoint");
        return Ok(vec![(min + max) / 2.0; data.len()]);
    }
    Ok(data
        .iter()
        .map(|x| min + (x - lo) * (max - min) / range)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fence_bounds_follow_quartiles() {
        let report = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0], 1.5).expect("report");
        // q1 = 2.25, q3 = 4.75
        assert_relative_eq!(report.lower_bound, -1.5, epsilon = 1e-12);
        assert_relative_eq!(report.upper_bound, 8.5, epsilon = 1e-12);
    }

    #[test]
    fn low_outliers_are_flagged_too() {
        let report = detect_outliers(&[-50.0, 10.0, 11.0, 12.0, 13.0], 1.5).expect("report");
        assert_eq!(report.outlier_indices, vec![0]);
    }

    #[test]
    fn zero_factor_fences_at_the_quartiles() {
        let report = detect_outliers(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.0).expect("report");
        assert_eq!(report.outlier_indices, vec![0, 4]);
        assert!(detect_outliers(&[1.0], -1.0).is_err());
    }

    #[test]
    fn normalized_data_has_unit_spread() {
        let z = normalize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).expect("z");
        assert_relative_eq!(mean::<_, f64>(z.iter()).0, 0.0, epsilon = 1e-12);
        assert_relative_eq!(variance::<_, f64>(z.iter()).0, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn scaling_empty_input_fails() {
        assert!(min_max_scale(&[], 0.0, 1.0).is_err());
        assert!(normalize(&[]).is_err());
    }
}
