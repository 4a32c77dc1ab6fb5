//! Level and noise measurements.
//!
//! Each measurement rejects an empty input instead of returning NaN.

use crate::{Error, Result};
use itertools::{Itertools, MinMaxResult};
use tracing::trace;

fn ensure_non_empty(signal: &[f64], arg: &str) -> Result<()> {
    if signal.is_empty() {
        return Err(Error::EmptyInput { arg: arg.into() });
    }
    Ok(())
}

fn mean_square(signal: &[f64]) -> f64 {
    signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64
}

/// Root mean square level.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::signal::measure::rms;
///
/// assert_relative_eq!(rms(&[3.0, -3.0, 3.0, -3.0]).unwrap(), 3.0);
/// assert!(rms(&[]).is_err());
/// ```
pub fn rms(signal: &[f64]) -> Result<f64> {
    ensure_non_empty(signal, "signal")?;
    Ok(mean_square(signal).sqrt())
}

/// Largest absolute sample.
pub fn peak(signal: &[f64]) -> Result<f64> {
    ensure_non_empty(signal, "signal")?;
    Ok(signal.iter().fold(0.0, |acc: f64, x| acc.max(x.abs())))
}

/// Difference between the largest and smallest sample.
///
/// ```
/// use sig_rs::signal::measure::{peak, peak_to_peak};
///
/// let x = [0.5, -2.0, 1.5];
/// assert_eq!(peak(&x).unwrap(), 2.0);
/// assert_eq!(peak_to_peak(&x).unwrap(), 3.5);
/// ```
pub fn peak_to_peak(signal: &[f64]) -> Result<f64> {
    match signal.iter().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements => Err(Error::EmptyInput {
            arg: "signal".into(),
        }),
        MinMaxResult::OneElement(_) => Ok(0.0),
        MinMaxResult::MinMax(lo, hi) => Ok(hi - lo),
    }
}

/// Signal-to-noise ratio in dB of `signal` against its noiseless reference.
///
/// The noise is `signal - clean`. A perfect match has no noise power and
/// yields `f64::INFINITY`.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::signal::measure::snr;
///
/// let clean = [1.0, -1.0, 1.0, -1.0];
/// let noisy = [1.1, -0.9, 1.1, -0.9];
/// assert_relative_eq!(snr(&noisy, &clean).unwrap(), 20.0, epsilon = 1e-9);
/// assert_eq!(snr(&clean, &clean).unwrap(), f64::INFINITY);
/// ```
pub fn snr(signal: &[f64], clean: &[f64]) -> Result<f64> {
    if signal.len() != clean.len() {
        return Err(Error::LengthMismatch {
            arg: "clean".into(),
            expected: signal.len(),
            got: clean.len(),
        });
    }
    ensure_non_empty(signal, "signal")?;

    let noise: Vec<f64> = signal.iter().zip(clean).map(|(s, c)| s - c).collect();
    let noise_power = mean_square(&noise);
    if noise_power == 0.0 {
        trace!("signal matches its reference, snr is unbounded");
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * (mean_square(clean) / noise_power).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::wave::{sine, SignalConfig};
    use approx::assert_relative_eq;

    #[test]
    fn sine_rms_is_amplitude_over_root_two() {
        let y = sine(SignalConfig::new(1000.0, 1.0).with_frequency(10.0).with_amplitude(2.0))
            .expect("sine");
        assert_relative_eq!(rms(&y).expect("rms"), 2.0 / 2f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(peak(&y).expect("peak"), 2.0, epsilon = 1e-9);
        assert_relative_eq!(peak_to_peak(&y).expect("p2p"), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn single_sample_has_no_swing() {
        assert_eq!(peak_to_peak(&[4.0]).expect("p2p"), 0.0);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(peak(&[]).is_err());
        assert!(peak_to_peak(&[]).is_err());
        assert!(snr(&[], &[]).is_err());
    }

    #[test]
    fn snr_requires_equal_lengths() {
        let err = snr(&[1.0, 2.0], &[1.0]).expect_err("mismatch");
        assert_eq!(
            err,
            Error::LengthMismatch {
                arg: "clean".into(),
                expected: 2,
                got: 1
            }
        );
    }
}
