use crate::kernel::KernelLifecycle;
use crate::{Error, Result};
use core::borrow::Borrow;
use core::iter::Sum;
use itertools::Itertools;
use num_traits::Float;
use tracing::trace;

use super::kernels::{Describe1D, StatsConfig, SummaryKernel};

/// Interpolated order statistics reported by [`basic_statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Percentiles {
    /// 25th percentile.
    pub p25: f64,
    /// 50th percentile, equal to the median.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 90th percentile.
    pub p90: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
}

/// Descriptive summary of a sample.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatisticsResult {
    /// Arithmetic mean.
    pub mean: f64,
    /// Middle order statistic, averaging the two middle values for even counts.
    pub median: f64,
    /// Every value sharing the highest frequency, ascending.
    pub mode: Vec<f64>,
    /// Population variance `Σ(x - mean)² / n`.
    pub variance: f64,
    /// Square root of [`StatisticsResult::variance`].
    pub standard_deviation: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// `max - min`.
    pub range: f64,
    /// Bias-corrected sample skewness, `0` when `n < 3` or the deviation is zero.
    pub skewness: f64,
    /// Bias-corrected excess kurtosis, `0` when `n < 4` or the deviation is zero.
    pub kurtosis: f64,
    /// Number of samples.
    pub count: usize,
    /// Sum of the samples.
    pub sum: f64,
    /// Interpolated percentiles.
    pub percentiles: Percentiles,
}

///
/// Mean of `y` and the number of points averaged.
///
/// An empty input yields `(0, 0)`.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::stats::mean;
///
/// let y = [1.0f64, 2.0, 3.0, 4.0, 5.0];
/// assert_relative_eq!(3f64, mean(y.iter()).0);
///
/// let y: &[f32] = &[];
/// assert_eq!((0f32, 0), mean(y.iter()));
/// ```
pub fn mean<YI, F>(y: YI) -> (F, usize)
where
    F: Float,
    YI: Iterator,
    YI::Item: Borrow<F>,
{
    let (sum, count) = y.fold((F::zero(), 0usize), |(sum, count), yi| {
        (sum + *yi.borrow(), count + 1)
    });
    match F::from(count) {
        Some(n) if count > 0 => (sum / n, count),
        _ => (F::zero(), 0),
    }
}

///
/// Population variance of `y` and the number of points.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::stats::variance;
///
/// let y = [1.0f64, 2.0, 3.0, 4.0, 5.0];
/// assert_relative_eq!(2f64, variance(y.iter()).0);
/// ```
pub fn variance<YI, F>(y: YI) -> (F, usize)
where
    F: Float + Sum,
    YI: Iterator + Clone,
    YI::Item: Borrow<F>,
{
    let (avg, n) = mean(y.clone());
    let squares: F = y
        .map(|yi| {
            let delta = *yi.borrow() - avg;
            delta * delta
        })
        .sum();
    match F::from(n) {
        Some(count) if n > 0 => (squares / count, n),
        _ => (F::zero(), 0),
    }
}

/// Linear interpolation between order statistics of an ascending slice.
pub(crate) fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let index = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = index - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    data.iter().copied().sorted_by(f64::total_cmp).collect()
}

fn ensure_non_empty(data: &[f64], arg: &str) -> Result<()> {
    if data.is_empty() {
        return Err(Error::EmptyInput { arg: arg.into() });
    }
    Ok(())
}

/// `p`-th percentile of `data`, `p` in `[0, 100]`.
///
/// ```
/// use sig_rs::stats::percentile;
///
/// let data = [4.0, 1.0, 3.0, 2.0];
/// assert_eq!(percentile(&data, 50.0).unwrap(), 2.5);
/// assert_eq!(percentile(&data, 100.0).unwrap(), 4.0);
/// assert!(percentile(&data, 101.0).is_err());
/// ```
pub fn percentile(data: &[f64], p: f64) -> Result<f64> {
    ensure_non_empty(data, "data")?;
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::invalid_arg("p", "percentile must be within [0, 100]"));
    }
    Ok(percentile_sorted(&sorted_copy(data), p))
}

fn modes(sorted: &[f64]) -> Vec<f64> {
    let runs: Vec<(usize, f64)> = sorted
        .iter()
        .dedup_with_count()
        .map(|(count, v)| (count, *v))
        .collect();
    let top = runs.iter().map(|(count, _)| *count).max().unwrap_or(0);
    runs.into_iter()
        .filter(|(count, _)| *count == top)
        .map(|(_, v)| v)
        .collect()
}

/// Standardized moment sum `Σ((x - mean) / sd)^k`.
fn standardized_moment(data: &[f64], mean: f64, sd: f64, k: i32) -> f64 {
    data.iter().map(|x| ((x - mean) / sd).powi(k)).sum()
}

/// Descriptive statistics of a non-empty sample.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::stats::basic_statistics;
///
/// let s = basic_statistics(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// assert_eq!(s.mean, 3.0);
/// assert_eq!(s.median, 3.0);
/// assert_eq!(s.variance, 2.0);
/// assert_relative_eq!(s.standard_deviation, 1.4142, epsilon = 1e-4);
/// assert_eq!((s.min, s.max, s.range), (1.0, 5.0, 4.0));
/// ```
pub fn basic_statistics(data: &[f64]) -> Result<StatisticsResult> {
    let kernel = SummaryKernel::try_new(StatsConfig)?;
    Ok(kernel.run(data)?)
}

/// Summary of a non-empty sample.
pub(crate) fn summarize(data: &[f64]) -> StatisticsResult {
    let sorted = sorted_copy(data);
    let n = data.len();
    let nf = n as f64;

    let sum: f64 = data.iter().sum();
    let (mean, _): (f64, _) = mean(data.iter());
    let (variance, _): (f64, _) = variance(data.iter());
    let sd = variance.sqrt();
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let (min, max) = (sorted[0], sorted[n - 1]);

    let skewness = if n < 3 || sd == 0.0 {
        trace!(n, sd, "skewness undefined, reporting 0");
        0.0
    } else {
        nf / ((nf - 1.0) * (nf - 2.0)) * standardized_moment(data, mean, sd, 3)
    };
    let kurtosis = if n < 4 || sd == 0.0 {
        trace!(n, sd, "kurtosis undefined, reporting 0");
        0.0
    } else {
        let scale = nf * (nf + 1.0) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));
        let correction = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
        scale * standardized_moment(data, mean, sd, 4) - correction
    };

    StatisticsResult {
        mean,
        median,
        mode: modes(&sorted),
        variance,
        standard_deviation: sd,
        min,
        max,
        range: max - min,
        skewness,
        kurtosis,
        count: n,
        sum,
        percentiles: Percentiles {
            p25: percentile_sorted(&sorted, 25.0),
            p50: median,
            p75: percentile_sorted(&sorted, 75.0),
            p90: percentile_sorted(&sorted, 90.0),
            p95: percentile_sorted(&sorted, 95.0),
            p99: percentile_sorted(&sorted, 99.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn five_point_summary() {
        let s = basic_statistics(&[1.0, 2.0, 3.0, 4.0, 5.0]).expect("stats");
        assert_eq!(s.count, 5);
        assert_eq!(s.sum, 15.0);
        assert_eq!(s.mode, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_relative_eq!(s.standard_deviation, 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(s.skewness, 0.0, epsilon = 1e-12);
        assert_relative_eq!(s.kurtosis, 2.625, epsilon = 1e-12);
        assert_eq!(s.percentiles.p25, 2.0);
        assert_eq!(s.percentiles.p75, 4.0);
        assert_relative_eq!(s.percentiles.p90, 4.6, epsilon = 1e-12);
        assert_relative_eq!(s.percentiles.p99, 4.96, epsilon = 1e-12);
    }

    #[test]
    fn even_count_median_averages_middle_pair() {
        let s = basic_statistics(&[7.0, 1.0, 3.0, 5.0]).expect("stats");
        assert_eq!(s.median, 4.0);
        assert_eq!(s.percentiles.p50, 4.0);
    }

    #[test]
    fn every_most_frequent_value_is_a_mode() {
        let s = basic_statistics(&[3.0, 1.0, 3.0, 2.0, 1.0]).expect("stats");
        assert_eq!(s.mode, vec![1.0, 3.0]);
    }

    #[test]
    fn skewed_sample_matches_reference() {
        let s = basic_statistics(&[1.0, 2.0, 2.0, 3.0, 10.0]).expect("stats");
        assert_relative_eq!(s.skewness, 2.8351931863402555, epsilon = 1e-9);
        assert_relative_eq!(s.kurtosis, 11.175228955848269, epsilon = 1e-9);
    }

    #[test]
    fn small_samples_report_zero_shape() {
        let two = basic_statistics(&[1.0, 3.0]).expect("stats");
        assert_eq!((two.skewness, two.kurtosis), (0.0, 0.0));

        let three = basic_statistics(&[1.0, 2.0, 9.0]).expect("stats");
        assert!(three.skewness > 0.0);
        assert_eq!(three.kurtosis, 0.0);

        let flat = basic_statistics(&[4.0; 6]).expect("stats");
        assert_eq!((flat.skewness, flat.kurtosis, flat.variance), (0.0, 0.0, 0.0));
    }

    #[test]
    fn empty_sample_is_rejected() {
        assert_eq!(
            basic_statistics(&[]).expect_err("empty"),
            Error::EmptyInput { arg: "data".into() }
        );
        assert!(percentile(&[], 50.0).is_err());
    }

    #[test]
    fn summary_agrees_with_generic_reductions() {
        let data = [0.5, -1.25, 3.0, 8.5, 2.0, 2.0];
        let s = basic_statistics(&data).expect("stats");
        assert_relative_eq!(s.mean, mean::<_, f64>(data.iter()).0, epsilon = 1e-12);
        assert_relative_eq!(s.variance, variance::<_, f64>(data.iter()).0, epsilon = 1e-12);
        assert_relative_eq!(s.standard_deviation, s.variance.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn generic_reductions_accept_f32() {
        let y = [1.0f32, 2.0, 3.0, 4.0];
        assert_relative_eq!(mean::<_, f32>(y.iter()).0, 2.5);
        assert_relative_eq!(variance::<_, f32>(y.iter()).0, 1.25);
        let empty: [f32; 0] = [];
        assert_eq!(variance::<_, f32>(empty.iter()), (0.0, 0));
    }
}
