use alloc::vec::Vec;
use num_traits::Zero;

/// Smallest power of two that is `>= n`. `0` maps to `1`.
///
/// ```
/// use sig_rs_core::num_rs::next_pow2;
///
/// assert_eq!(next_pow2(0), 1);
/// assert_eq!(next_pow2(100), 128);
/// assert_eq!(next_pow2(128), 128);
/// ```
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Copy `x` into a zero-filled buffer whose length is [`next_pow2`] of `x.len()`.
///
/// ```
/// use sig_rs_core::num_rs::zero_pad_pow2;
///
/// let padded = zero_pad_pow2(&[1.0, 2.0, 3.0]);
/// assert_eq!(padded, vec![1.0, 2.0, 3.0, 0.0]);
/// ```
pub fn zero_pad_pow2<T>(x: &[T]) -> Vec<T>
where
    T: Zero + Copy,
{
    let mut out = Vec::with_capacity(next_pow2(x.len()));
    out.extend_from_slice(x);
    out.resize(next_pow2(x.len()), T::zero());
    out
}
