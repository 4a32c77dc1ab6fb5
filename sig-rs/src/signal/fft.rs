//! Radix-2 fast Fourier transform.
//!
//! [`Radix2Fft`] is a reusable plan: the bit-reversal permutation and the
//! twiddle factors `e^{-2πik/N}` are computed once at construction and each
//! run transforms a buffer in place with the iterative Cooley–Tukey
//! butterflies. The ordering of the output is the same as the textbook
//! recursive even/odd split.

use crate::kernel::{ConfigError, ExecInvariantViolation, KernelLifecycle, Read1D};
use crate::signal::traits::Transform1D;
use crate::{Error, Result};
use core::f64::consts::PI;
use tracing::trace;

/// Complex sample type used by the spectral code.
pub type Complex64 = nalgebra::Complex<f64>;

/// Transform direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftDirection {
    /// `X[k] = Σ x[n] e^{-2πikn/N}`.
    #[default]
    Forward,
    /// `x[n] = 1/N Σ X[k] e^{2πikn/N}`, computed as conjugate, forward, conjugate, scale.
    Inverse,
}

/// Constructor config for [`Radix2Fft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftConfig {
    /// Transform length. Must be a power of two.
    pub len: usize,
    /// Transform direction.
    pub direction: FftDirection,
}

/// Precomputed in-place radix-2 FFT plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Radix2Fft {
    len: usize,
    direction: FftDirection,
    bitrev: Vec<usize>,
    twiddles: Vec<Complex64>,
}

impl Radix2Fft {
    /// Transform length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false, a plan has at least one point.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn forward_in_place(&self, buf: &mut [Complex64]) {
        let n = self.len;
        for (i, &j) in self.bitrev.iter().enumerate() {
            if i < j {
                buf.swap(i, j);
            }
        }

        let mut size = 2;
        while size <= n {
            let half = size / 2;
            let stride = n / size;
            for start in (0..n).step_by(size) {
                for k in 0..half {
                    let w = self.twiddles[k * stride];
                    let even = buf[start + k];
                    let odd = buf[start + k + half] * w;
                    buf[start + k] = even + odd;
                    buf[start + k + half] = even - odd;
                }
            }
            size *= 2;
        }
    }
}

impl KernelLifecycle for Radix2Fft {
    type Config = FftConfig;

    fn try_new(config: Self::Config) -> core::result::Result<Self, ConfigError> {
        let n = config.len;
        if n == 0 {
            return Err(ConfigError::EmptyInput { arg: "len" });
        }
        if !n.is_power_of_two() {
            return Err(ConfigError::InvalidArgument {
                arg: "len",
                reason: "length must be a power of two",
            });
        }

        let bits = n.trailing_zeros();
        let bitrev = if bits == 0 {
            vec![0]
        } else {
            (0..n)
                .map(|i| i.reverse_bits() >> (usize::BITS - bits))
                .collect()
        };
        let twiddles = (0..n / 2)
            .map(|k| Complex64::from_polar(1.0, -2.0 * PI * k as f64 / n as f64))
            .collect();
        trace!(len = n, direction = ?config.direction, "planned radix-2 FFT");

        Ok(Self {
            len: n,
            direction: config.direction,
            bitrev,
            twiddles,
        })
    }
}

impl Transform1D for Radix2Fft {
    fn run_in_place(&self, buf: &mut [Complex64]) -> core::result::Result<(), ExecInvariantViolation> {
        if buf.len() != self.len {
            return Err(ExecInvariantViolation::LengthMismatch {
                arg: "buf",
                expected: self.len,
                got: buf.len(),
            });
        }
        match self.direction {
            FftDirection::Forward => self.forward_in_place(buf),
            FftDirection::Inverse => {
                buf.iter_mut().for_each(|c| *c = c.conj());
                self.forward_in_place(buf);
                let scale = 1.0 / self.len as f64;
                buf.iter_mut().for_each(|c| *c = c.conj() * scale);
            }
        }
        Ok(())
    }

    fn run_alloc<I>(&self, input: &I) -> core::result::Result<Vec<Complex64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized,
    {
        let input = input.read_slice().map_err(ExecInvariantViolation::from)?;
        let mut buf: Vec<Complex64> = input.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        self.run_in_place(&mut buf)?;
        Ok(buf)
    }
}

fn plan(len: usize, direction: FftDirection) -> Result<Radix2Fft> {
    if len == 0 {
        return Err(Error::EmptyInput { arg: "data".into() });
    }
    if !len.is_power_of_two() {
        return Err(Error::NotPowerOfTwo { len });
    }
    Ok(Radix2Fft::try_new(FftConfig { len, direction })?)
}

/// Forward FFT of a real sequence whose length is a power of two.
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use sig_rs::signal::fft::fft;
///
/// let spectrum = fft(&[1.0, 0.0, 0.0, 0.0]).unwrap();
/// for bin in spectrum {
///     assert_abs_diff_eq!(bin.norm(), 1.0);
///     assert_abs_diff_eq!(bin.arg(), 0.0);
/// }
///
/// assert!(fft(&[1.0, 2.0, 3.0]).is_err());
/// ```
pub fn fft(data: &[f64]) -> Result<Vec<Complex64>> {
    Ok(plan(data.len(), FftDirection::Forward)?.run_alloc(data)?)
}

/// Forward FFT of a complex sequence whose length is a power of two.
pub fn fft_complex(data: &[Complex64]) -> Result<Vec<Complex64>> {
    let kernel = plan(data.len(), FftDirection::Forward)?;
    let mut buf = data.to_vec();
    kernel.run_in_place(&mut buf)?;
    Ok(buf)
}

/// Inverse FFT returning the full complex sequence.
pub fn ifft_complex(spectrum: &[Complex64]) -> Result<Vec<Complex64>> {
    let kernel = plan(spectrum.len(), FftDirection::Inverse)?;
    let mut buf = spectrum.to_vec();
    kernel.run_in_place(&mut buf)?;
    Ok(buf)
}

/// Inverse FFT returning only the real parts.
///
/// ```
/// use approx::assert_abs_diff_eq;
/// use sig_rs::signal::fft::{fft, ifft};
///
/// let x = [0.5, -1.0, 2.0, 0.25, 0.0, 3.0, -2.0, 1.0];
/// let y = ifft(&fft(&x).unwrap()).unwrap();
/// x.iter().zip(y.iter()).for_each(|(a, b)| assert_abs_diff_eq!(a, b, epsilon = 1e-12));
/// ```
pub fn ifft(spectrum: &[Complex64]) -> Result<Vec<f64>> {
    Ok(ifft_complex(spectrum)?.into_iter().map(|c| c.re).collect())
}
