use crate::kernel::ConfigError;
use nalgebra::DMatrix;
use tracing::debug;

/// Savitzky–Golay smoothing weights for an odd `window`.
///
/// Row zero of the pseudo-inverse of the Vandermonde matrix over offsets
/// `-h..=h`, i.e. the weights that evaluate the least-squares polynomial of
/// degree `polyorder` at the window centre. Weights are in window order, so
/// the smoothed sample is `Σ c[j] x[i - h + j]`.
pub(crate) fn least_squares_weights(window: usize, polyorder: usize) -> Result<Vec<f64>, ConfigError> {
    if window % 2 == 0 {
        return Err(ConfigError::InvalidArgument {
            arg: "window",
            reason: "window must be odd",
        });
    }
    if polyorder >= window {
        return Err(ConfigError::InvalidArgument {
            arg: "polyorder",
            reason: "polyorder must be less than window",
        });
    }

    let half = (window / 2) as f64;
    let vandermonde = DMatrix::from_fn(window, polyorder + 1, |r, c| {
        (r as f64 - half).powi(c as i32)
    });
    let pinv = vandermonde
        .pseudo_inverse(1e-12)
        .map_err(|_| ConfigError::InvalidArgument {
            arg: "polyorder",
            reason: "least-squares fit is singular",
        })?;
    let weights: Vec<f64> = pinv.row(0).iter().copied().collect();
    debug!(window, polyorder, "derived Savitzky-Golay weights");
    Ok(weights)
}

/// Savitzky–Golay smoothing weights.
///
/// An even `window` is widened by one.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::signal::filter::savgol_coeffs;
///
/// let c = savgol_coeffs(5, 2).unwrap();
/// let expected = [-3.0, 12.0, 17.0, 12.0, -3.0].map(|v| v / 35.0);
/// c.iter().zip(expected.iter()).for_each(|(a, b)| assert_relative_eq!(a, b, epsilon = 1e-12));
///
/// assert!(savgol_coeffs(5, 5).is_err());
/// ```
pub fn savgol_coeffs(window: usize, polyorder: usize) -> crate::Result<Vec<f64>> {
    let window = window | 1;
    Ok(least_squares_weights(window, polyorder)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_weights(window: usize, polyorder: usize, numerators: &[f64], denominator: f64) {
        let w = least_squares_weights(window, polyorder).expect("weights");
        assert_eq!(w.len(), numerators.len());
        w.iter()
            .zip(numerators.iter())
            .for_each(|(a, n)| assert_relative_eq!(*a, n / denominator, epsilon = 1e-10));
    }

    #[test]
    fn classic_quadratic_tables() {
        assert_weights(5, 2, &[-3.0, 12.0, 17.0, 12.0, -3.0], 35.0);
        assert_weights(7, 2, &[-2.0, 3.0, 6.0, 7.0, 6.0, 3.0, -2.0], 21.0);
        assert_weights(
            9,
            2,
            &[-21.0, 14.0, 39.0, 54.0, 59.0, 54.0, 39.0, 14.0, -21.0],
            231.0,
        );
    }

    #[test]
    fn odd_order_matches_the_even_order_below() {
        let quadratic = least_squares_weights(7, 2).expect("quadratic");
        let cubic = least_squares_weights(7, 3).expect("cubic");
        quadratic
            .iter()
            .zip(cubic.iter())
            .for_each(|(a, b)| assert_relative_eq!(a, b, epsilon = 1e-10));
    }

    #[test]
    fn order_zero_is_a_box_filter() {
        let w = least_squares_weights(5, 0).expect("box");
        w.iter().for_each(|v| assert_relative_eq!(*v, 0.2, epsilon = 1e-12));
        assert_eq!(least_squares_weights(1, 0).expect("identity"), vec![1.0]);
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        assert!(matches!(
            least_squares_weights(4, 1),
            Err(ConfigError::InvalidArgument { arg: "window", .. })
        ));
        assert!(matches!(
            least_squares_weights(3, 3),
            Err(ConfigError::InvalidArgument { arg: "polyorder", .. })
        ));
        assert_eq!(savgol_coeffs(4, 2).expect("widened").len(), 5);
    }
}
