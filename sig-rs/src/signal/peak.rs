//! Time-domain peak picking on sampled signals.

use num_traits::Float;

/// Options for [`find_signal_peaks`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalPeakOptions<F> {
    /// Minimum peak level as a fraction of the largest absolute sample.
    pub threshold: F,
    /// Half width of the neighbourhood a peak must dominate, in samples.
    pub min_distance: usize,
}

impl<F: Float> Default for SignalPeakOptions<F> {
    fn default() -> Self {
        Self {
            threshold: F::from(0.1).unwrap_or_else(F::zero),
            min_distance: 1,
        }
    }
}

/// Indices whose absolute value reaches `threshold * max|x|` and strictly
/// exceeds every other absolute value within `min_distance` samples.
///
/// Samples closer than `min_distance` to either end are never reported, so a
/// signal shorter than `2 * min_distance + 1` has no peaks.
///
/// ```
/// use sig_rs::signal::peak::{find_signal_peaks, SignalPeakOptions};
///
/// let x = [0.0, 1.0, 0.0, -3.0, 0.0, 0.2, 0.0];
/// assert_eq!(find_signal_peaks(&x, SignalPeakOptions::default()), vec![1, 3]);
///
/// let strict = SignalPeakOptions { threshold: 0.5, min_distance: 2 };
/// assert_eq!(find_signal_peaks(&x, strict), vec![3]);
/// ```
pub fn find_signal_peaks<F>(x: &[F], options: SignalPeakOptions<F>) -> Vec<usize>
where
    F: Float,
{
    let d = options.min_distance;
    if x.len() <= 2 * d {
        return Vec::new();
    }
    let max = x.iter().fold(F::zero(), |acc, v| acc.max(v.abs()));
    let floor = max * options.threshold;

    (d..x.len() - d)
        .filter(|&i| {
            let current = x[i].abs();
            current >= floor
                && (i - d..=i + d)
                    .filter(|&j| j != i)
                    .all(|j| x[j].abs() < current)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_excursions_count_as_peaks() {
        let x = [0.0f64, -0.5, -2.0, -0.5, 0.0];
        assert_eq!(find_signal_peaks(&x, SignalPeakOptions::default()), vec![2]);
    }

    #[test]
    fn plateaus_are_not_peaks() {
        let x = [0.0f64, 1.0, 1.0, 0.0];
        assert!(find_signal_peaks(&x, SignalPeakOptions::default()).is_empty());
    }

    #[test]
    fn threshold_is_relative_to_largest_sample() {
        let x = [0.0f64, 0.05, 0.0, 1.0, 0.0, 0.2, 0.0];
        let opts = SignalPeakOptions {
            threshold: 0.1,
            min_distance: 1,
        };
        assert_eq!(find_signal_peaks(&x, opts), vec![3, 5]);
    }

    #[test]
    fn short_signals_have_no_peaks() {
        let opts = SignalPeakOptions {
            threshold: 0.0,
            min_distance: 2,
        };
        assert!(find_signal_peaks(&[0.0f64, 1.0, 0.0, 0.5], opts).is_empty());
        assert!(find_signal_peaks::<f64>(&[], SignalPeakOptions::default()).is_empty());
    }

    #[test]
    fn sine_peaks_are_one_period_apart() {
        let x: Vec<f64> = (0..100)
            .map(|i| (2.0 * core::f64::consts::PI * i as f64 / 20.0).sin())
            .collect();
        let peaks = find_signal_peaks(&x, SignalPeakOptions::default());
        // crests at 5, 25, ... and troughs at 15, 35, ...
        assert_eq!(peaks, vec![5, 15, 25, 35, 45, 55, 65, 75, 85, 95]);
    }
}
