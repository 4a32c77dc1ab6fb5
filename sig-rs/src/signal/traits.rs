//! Trait interfaces for signal-processing capabilities.
//!
//! Kernels implement these so callers can run them against any [`Read1D`]
//! input and, where the output length is known up front, into any
//! caller-owned [`Write1D`] buffer.

use crate::kernel::{ExecInvariantViolation, Read1D, Write1D};
use crate::signal::fft::Complex64;
use crate::signal::spectral::{FftResult, SpectralPeak, SpectrogramResult};

/// Generation of a fixed-length sequence (waveforms, noise, windows).
pub trait Generate1D<T> {
    /// Number of samples one run produces.
    fn output_len(&self) -> usize;

    /// Generate into a caller-provided output buffer of [`Generate1D::output_len`] samples.
    fn run_into<O>(&self, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        O: Write1D<T> + ?Sized;

    /// Generate and allocate output.
    fn run_alloc(&self) -> Result<Vec<T>, ExecInvariantViolation>;
}

/// In-place complex transform capability.
pub trait Transform1D {
    /// Transform `buf` in place.
    fn run_in_place(&self, buf: &mut [Complex64]) -> Result<(), ExecInvariantViolation>;

    /// Transform a real input and allocate complex output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<Complex64>, ExecInvariantViolation>
    where
        I: Read1D<f64> + ?Sized;
}

/// Power spectral density capability.
pub trait PowerSpectrum1D<T> {
    /// Compute the one-sided spectrum of `input`.
    fn run<I>(&self, input: &I) -> Result<FftResult, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Spectral peak detection capability.
pub trait SpectralPeaks1D<T> {
    /// Locate peaks in the spectrum of `input`, strongest first.
    fn run<I>(&self, input: &I) -> Result<Vec<SpectralPeak>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Short-time power spectrum capability.
pub trait Spectrogram1D<T> {
    /// Compute the spectrogram of `input`.
    fn run<I>(&self, input: &I) -> Result<SpectrogramResult, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Stateful streaming filter capability.
pub trait StreamFilter1D<T> {
    /// Filter into a caller-provided output buffer, advancing filter state.
    fn run_into<I, O>(&mut self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Filter and allocate output, advancing filter state.
    fn run_alloc<I>(&mut self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}

/// Stateless smoothing capability.
pub trait Smooth1D<T> {
    /// Smooth into a caller-provided output buffer.
    fn run_into<I, O>(&self, input: &I, out: &mut O) -> Result<(), ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized,
        O: Write1D<T> + ?Sized;

    /// Smooth and allocate output.
    fn run_alloc<I>(&self, input: &I) -> Result<Vec<T>, ExecInvariantViolation>
    where
        I: Read1D<T> + ?Sized;
}
