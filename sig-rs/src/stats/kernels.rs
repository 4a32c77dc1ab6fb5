//! Capability traits and trait-first kernels for sample statistics.

use crate::kernel::{
    read_non_empty, ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D, Write1D,
};

use super::descriptive::{summarize, StatisticsResult};
use super::histogram::{count_into_bins, validate_bins, HistogramBins, HistogramData};
use super::scaling::{fence, zscores_into, OutlierReport};

/// 1D descriptive summary capability.
pub trait Describe1D<T> {
    /// Summarize a non-empty input.
    fn run<I>(&self, input: &I) -> Result<StatisticsResult, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D histogram capability.
pub trait Histogram1D<T> {
    /// Bin a non-empty input.
    fn run<I>(&self, input: &I) -> Result<HistogramData, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D outlier detection capability.
pub trait OutlierReport1D<T> {
    /// Fence a non-empty input.
    fn run<I>(&self, input: &I) -> Result<OutlierReport, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// 1D z-score normalization capability.
pub trait ZScoreNormalize1D<T> {
    /// Normalize into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Normalize and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Empty config for stateless kernels.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsConfig;

/// Trait-first descriptive statistics kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryKernel;

impl KernelLifecycle for SummaryKernel {
    type Config = StatsConfig;

    fn try_new(_: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self)
    }
}

impl Describe1D<f64> for SummaryKernel {
    fn run<I>(&self, input: &I) -> Result<StatisticsResult, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = read_non_empty(input, "data")?;
        Ok(summarize(input))
    }
}

/// Constructor config for [`HistogramKernel`].
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistogramConfig {
    /// Bin layout.
    pub bins: HistogramBins,
}

/// Trait-first histogram kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramKernel {
    bins: HistogramBins,
}

impl KernelLifecycle for HistogramKernel {
    type Config = HistogramConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        validate_bins(&config.bins)?;
        Ok(Self { bins: config.bins })
    }
}

impl Histogram1D<f64> for HistogramKernel {
    fn run<I>(&self, input: &I) -> Result<HistogramData, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = read_non_empty(input, "data")?;
        if input.iter().any(|x| !x.is_finite()) {
            return Err(ConfigError::InvalidArgument {
                arg: "data",
                reason: "samples must be finite",
            }
            .into());
        }
        Ok(count_into_bins(input, &self.bins))
    }
}

/// Constructor config for [`OutlierKernel`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlierConfig {
    /// Fence distance in interquartile ranges.
    pub factor: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self { factor: 1.5 }
    }
}

/// Trait-first interquartile fence kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierKernel {
    factor: f64,
}

impl KernelLifecycle for OutlierKernel {
    type Config = OutlierConfig;

    fn try_new(config: Self::Config) -> Result<Self, ConfigError> {
        if !config.factor.is_finite() || config.factor < 0.0 {
            return Err(ConfigError::InvalidArgument {
                arg: "factor",
                reason: "factor must be finite and non-negative",
            });
        }
        Ok(Self {
            factor: config.factor,
        })
    }
}

impl OutlierReport1D<f64> for OutlierKernel {
    fn run<I>(&self, input: &I) -> Result<OutlierReport, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = read_non_empty(input, "data")?;
        Ok(fence(input, self.factor))
    }
}

/// Trait-first z-score kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScoreKernel;

impl KernelLifecycle for ZScoreKernel {
    type Config = StatsConfig;

    fn try_new(_: Self::Config) -> Result<Self, ConfigError> {
        Ok(Self)
    }
}

impl ZScoreNormalize1D<f64> for ZScoreKernel {
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
        O: Write1D<f64> + ?Sized,
    {
        let input = read_non_empty(input, "data")?;
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
        zscores_into(input, out);
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> Result<Vec<f64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = read_non_empty(input, "data")?;
        let mut out = vec![0.0; input.len()];
        zscores_into(input, &mut out);
        Ok(out)
    }
}
