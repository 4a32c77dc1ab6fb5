//! Statistics over sample sequences.
//!
//! Every function is pure. Operations that summarize a sample reject an empty
//! input, while degenerate but valid inputs (no spread, no range) return the
//! documented sentinel instead of dividing by zero.

mod averages;
mod descriptive;
mod histogram;
mod kernels;
mod regression;
mod scaling;

pub use averages::*;
pub use descriptive::{basic_statistics, mean, percentile, variance, Percentiles, StatisticsResult};
pub use histogram::{histogram, HistogramBins, HistogramData};
pub use kernels::*;
pub use regression::*;
pub use scaling::{detect_outliers, min_max_scale, normalize, OutlierReport};
