//! Special functions used by window design.

use num_traits::Float;

const I0_MAX_TERMS: usize = 50;
const I0_TOLERANCE: f64 = 1e-12;

/// Modified Bessel function of the first kind, order zero.
///
/// Evaluated by its power series `Σ ((x/2)^k / k!)²`, stopping after 50 terms
/// or once a term drops below `1e-12`.
///
/// ```
/// use approx::assert_relative_eq;
/// use sig_rs::special::bessel_i0;
///
/// assert_relative_eq!(bessel_i0(0.0f64), 1.0);
/// assert_relative_eq!(bessel_i0(1.0f64), 1.266_065_877_752_008_4, epsilon = 1e-10);
/// assert_relative_eq!(bessel_i0(5.0f64), 27.239_871_823_604_44, epsilon = 1e-8);
/// ```
pub fn bessel_i0<F>(x: F) -> F
where
    F: Float,
{
    let half_x = x / (F::one() + F::one());
    let tolerance = F::from(I0_TOLERANCE).unwrap_or_else(F::epsilon);
    let mut sum = F::one();
    let mut term = F::one();
    for k in 1..=I0_MAX_TERMS {
        let kf = F::from(k).unwrap_or_else(F::one);
        term = term * half_x / kf;
        let sq = term * term;
        sum = sum + sq;
        if sq < tolerance {
            break;
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::bessel_i0;
    use approx::assert_relative_eq;

    #[test]
    fn i0_is_even() {
        for x in [0.5f64, 2.0, 7.5] {
            assert_relative_eq!(bessel_i0(x), bessel_i0(-x), epsilon = 1e-12);
        }
    }

    #[test]
    fn i0_f32_tracks_f64() {
        assert_relative_eq!(bessel_i0(3.0f32) as f64, bessel_i0(3.0f64), epsilon = 1e-4);
    }
}
