use crate::{Error, Result};
use ndarray::{Array1, ArrayView1};
use sig_rs_core::num_rs::{convolve, ConvolveMode};

/// Trailing mean over every full window, `len - window + 1` outputs.
///
/// ```
/// use sig_rs::stats::moving_average;
///
/// assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2).unwrap(), vec![1.5, 2.5, 3.5]);
/// assert!(moving_average(&[1.0, 2.0], 3).is_err());
/// ```
pub fn moving_average(data: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 || window > data.len() {
        return Err(Error::invalid_arg(
            "window",
            "window must be positive and no longer than the data",
        ));
    }
    let taps = Array1::from_elem(window, 1.0 / window as f64);
    let y = convolve(ArrayView1::from(data), taps.view(), ConvolveMode::Valid)?;
    Ok(y.to_vec())
}

/// Exponentially weighted mean seeded with the first sample,
/// `ema = alpha * x + (1 - alpha) * ema`.
///
/// ```
/// use sig_rs::stats::exponential_moving_average;
///
/// let y = exponential_moving_average(&[0.0, 10.0, 10.0], 0.5).unwrap();
/// assert_eq!(y, vec![0.0, 5.0, 7.5]);
/// ```
pub fn exponential_moving_average(data: &[f64], alpha: f64) -> Result<Vec<f64>> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(Error::invalid_arg("alpha", "alpha must be in (0, 1]"));
    }
    let Some(&first) = data.first() else {
        return Ok(Vec::new());
    };
    let tail = data[1..].iter().scan(first, |ema, &x| {
        *ema = alpha * x + (1.0 - alpha) * *ema;
        Some(*ema)
    });
    Ok(core::iter::once(first).chain(tail).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn full_window_is_the_mean() {
        let y = moving_average(&[2.0, 4.0, 9.0], 3).expect("average");
        assert_eq!(y.len(), 1);
        assert_relative_eq!(y[0], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(moving_average(&[1.0], 0).is_err());
        assert!(moving_average(&[], 1).is_err());
    }

    #[test]
    fn alpha_one_tracks_input() {
        let x = [3.0, -1.0, 4.0];
        assert_eq!(exponential_moving_average(&x, 1.0).expect("ema"), x.to_vec());
        for alpha in [0.0, -0.1, 1.5, f64::NAN] {
            assert!(exponential_moving_average(&x, alpha).is_err());
        }
        assert!(exponential_moving_average(&[], 0.2).expect("ema").is_empty());
    }
}
