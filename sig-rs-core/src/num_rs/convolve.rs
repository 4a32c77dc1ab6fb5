use crate::{Error, Result};
use alloc::string::ToString;
use ndarray::{Array1, ArrayView1};
use ndarray_conv::{ConvExt, ConvMode, PaddingMode};

/// Convolution mode determines behavior near edges and output size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveMode {
    /// Full convolution, output size is `in1.len() + in2.len() - 1`
    Full,
    /// Valid convolution, output size is `max(in1.len(), in2.len()) - min(in1.len(), in2.len()) + 1`
    Valid,
    /// Same convolution, output size is `in1.len()`
    Same,
}

impl From<ConvolveMode> for ConvMode<1> {
    fn from(mode: ConvolveMode) -> Self {
        match mode {
            ConvolveMode::Full => ConvMode::Full,
            ConvolveMode::Valid => ConvMode::Valid,
            ConvolveMode::Same => ConvMode::Same,
        }
    }
}

/// Best effort parallel behaviour with numpy's convolve method. We take `v` as the convolution
/// kernel.
///
/// Returns the discrete, linear convolution of two one-dimensional sequences.
///
/// # Parameters
/// * `a` : (N,) signal to be (linearly) convolved.
/// * `v` : (M,) second one-dimensional input array.
/// * `mode` : [ConvolveMode]
///   [ConvolveMode::Full] returns the convolution at each point of overlap, with an output
///   shape of (N+M-1,).
///   [ConvolveMode::Same] returns output of length `N` with zeros beyond the edges.
///   [ConvolveMode::Valid] returns output of length `max(M, N) - min(M, N) + 1`; the
///   longer operand is treated as the signal.
///
/// # Errors
/// Either input being empty.
///
/// # Examples
/// ```
/// use ndarray::array;
/// use sig_rs_core::num_rs::{ConvolveMode, convolve};
///
/// let a = array![1., 2., 3.];
/// let v = array![0., 1., 0.5];
///
/// let full = convolve(a.view(), v.view(), ConvolveMode::Full).unwrap();
/// assert_eq!(full, array![0., 1., 2.5, 4., 1.5]);
///
/// let same = convolve(a.view(), v.view(), ConvolveMode::Same).unwrap();
/// assert_eq!(same, array![1., 2.5, 4.]);
///
/// let valid = convolve(a.view(), v.view(), ConvolveMode::Valid).unwrap();
/// assert_eq!(valid, array![2.5]);
/// ```
pub fn convolve<'a, T>(
    a: ArrayView1<'a, T>,
    v: ArrayView1<'a, T>,
    mode: ConvolveMode,
) -> Result<Array1<T>>
where
    T: num_traits::NumAssign + Copy,
{
    check_non_empty(&a, &v)?;
    let (signal, kernel) = if mode == ConvolveMode::Valid && v.len() > a.len() {
        (v, a)
    } else {
        (a, v)
    };
    signal
        .conv(&kernel, mode.into(), PaddingMode::Zeros)
        .map_err(|e| Error::Conv {
            reason: e.to_string(),
        })
}

/// Same-size convolution of `a` with the odd-length kernel `v`, replicating
/// the edge samples of `a` beyond both ends.
///
/// ```
/// use ndarray::array;
/// use sig_rs_core::num_rs::convolve_same_replicate;
///
/// let a = array![1.0f64, 2., 3., 10.];
/// let v = array![1.0f64 / 3., 1. / 3., 1. / 3.];
///
/// let edge = convolve_same_replicate(a.view(), v.view()).unwrap();
/// assert!((edge[0] - 4. / 3.).abs() < 1e-12);
/// assert!((edge[3] - 23. / 3.).abs() < 1e-12);
/// ```
pub fn convolve_same_replicate<'a, T>(
    a: ArrayView1<'a, T>,
    v: ArrayView1<'a, T>,
) -> Result<Array1<T>>
where
    T: num_traits::NumAssign + Copy,
{
    check_non_empty(&a, &v)?;
    if v.len() % 2 == 0 {
        return Err(Error::invalid_arg("v", "kernel length must be odd"));
    }
    a.conv(&v, ConvMode::Same, PaddingMode::Replicate)
        .map_err(|e| Error::Conv {
            reason: e.to_string(),
        })
}

fn check_non_empty<T>(a: &ArrayView1<T>, v: &ArrayView1<T>) -> Result<()> {
    if a.is_empty() {
        return Err(Error::EmptyInput { arg: "a".into() });
    }
    if v.is_empty() {
        return Err(Error::EmptyInput { arg: "v".into() });
    }
    Ok(())
}
