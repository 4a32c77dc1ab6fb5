use crate::kernel::{ConfigError, KernelLifecycle};
use crate::Result;
use itertools::Itertools;

use super::kernels::{Histogram1D, HistogramConfig, HistogramKernel};

/// Bin layout for [`histogram`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HistogramBins {
    /// Equal-width bins spanning `[min, max]` of the data.
    Count(usize),
    /// Explicit edges, sorted before use. `n` edges make `n - 1` bins.
    Edges(Vec<f64>),
}

impl Default for HistogramBins {
    fn default() -> Self {
        HistogramBins::Count(10)
    }
}

/// Bin centres and their counts.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistogramData {
    /// Bin centres.
    pub bins: Vec<f64>,
    /// Samples per bin.
    pub counts: Vec<usize>,
    /// Width of each bin, `0` when explicit edges were supplied.
    pub bin_width: f64,
    /// Number of input samples, binned or not.
    pub total_count: usize,
}

/// Reject layouts that cannot hold a sample.
pub(crate) fn validate_bins(bins: &HistogramBins) -> core::result::Result<(), ConfigError> {
    match bins {
        HistogramBins::Count(0) => Err(ConfigError::InvalidArgument {
            arg: "bins",
            reason: "bin count must be positive",
        }),
        HistogramBins::Count(_) => Ok(()),
        HistogramBins::Edges(edges) if edges.len() < 2 => Err(ConfigError::InvalidArgument {
            arg: "bins",
            reason: "at least two edges are required",
        }),
        HistogramBins::Edges(edges) if edges.iter().any(|e| !e.is_finite()) => {
            Err(ConfigError::InvalidArgument {
                arg: "bins",
                reason: "edges must be finite",
            })
        }
        HistogramBins::Edges(_) => Ok(()),
    }
}

/// Edges and width for a validated layout over non-empty, finite `data`.
fn bin_edges(data: &[f64], bins: &HistogramBins) -> (Vec<f64>, f64) {
    match bins {
        HistogramBins::Count(count) => {
            let (min, max) = data
                .iter()
                .copied()
                .minmax_by(f64::total_cmp)
                .into_option()
                .unwrap_or((0.0, 0.0));
            let n = *count as f64;
            // interpolate the bounds directly when `max - min` overflows
            let edge = |t: f64| match min + (max - min) * t {
                e if e.is_finite() => e,
                _ => min * (1.0 - t) + max * t,
            };
            let mut edges: Vec<f64> = (0..*count).map(|i| edge(i as f64 / n)).collect();
            edges.push(max);
            let width = match (max - min) / n {
                w if w.is_finite() => w,
                _ => max / n - min / n,
            };
            (edges, width)
        }
        HistogramBins::Edges(edges) => (
            edges.iter().copied().sorted_by(f64::total_cmp).collect(),
            0.0,
        ),
    }
}

/// Count `data` into half-open bins `[e_i, e_{i+1})`, the last bin closed.
///
/// Samples outside explicit edges are not counted but still contribute to
/// [`HistogramData::total_count`]. Non-finite samples are rejected.
///
/// ```
/// use sig_rs::stats::{histogram, HistogramBins};
///
/// let h = histogram(&[0.0, 1.0, 1.5, 2.0, 4.0], HistogramBins::Count(2)).unwrap();
/// assert_eq!(h.bins, vec![1.0, 3.0]);
/// assert_eq!(h.counts, vec![3, 2]);
/// assert_eq!(h.bin_width, 2.0);
///
/// let h = histogram(&[0.5, 1.5, 9.0], HistogramBins::Edges(vec![2.0, 0.0, 1.0])).unwrap();
/// assert_eq!(h.counts, vec![1, 1]);
/// assert_eq!(h.total_count, 3);
/// ```
pub fn histogram(data: &[f64], bins: HistogramBins) -> Result<HistogramData> {
    let kernel = HistogramKernel::try_new(HistogramConfig { bins })?;
    Ok(kernel.run(data)?)
}

/// Bin non-empty, finite `data` into a validated layout.
pub(crate) fn count_into_bins(data: &[f64], bins: &HistogramBins) -> HistogramData {
    let (edges, bin_width) = bin_edges(data, bins);
    let last = edges.len() - 2;

    let mut counts = vec![0usize; edges.len() - 1];
    for &x in data {
        let slot = edges
            .iter()
            .tuple_windows()
            .position(|(lo, hi)| x >= *lo && x < *hi)
            .or_else(|| (x >= edges[last] && x <= edges[last + 1]).then_some(last));
        if let Some(i) = slot {
            counts[i] += 1;
        }
    }

    HistogramData {
        bins: edges
            .iter()
            .tuple_windows()
            .map(|(lo, hi)| lo / 2.0 + hi / 2.0)
            .collect(),
        counts,
        bin_width,
        total_count: data.len(),
    }
}
