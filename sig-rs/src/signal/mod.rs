/// Radix-2 FFT and its inverse.
pub mod fft;

/// IIR design, streaming execution and smoothing filters.
pub mod filter;

/// Level and noise measurements on sampled signals.
pub mod measure;

/// White, pink and brown noise.
pub mod noise;

/// Time-domain peak picking.
pub mod peak;

/// Power spectral density, spectral peaks, spectrogram and distortion.
pub mod spectral;

/// Capability traits implemented by kernels.
pub mod traits;

/// Deterministic waveforms.
pub mod wave;

/// Window functions.
pub mod windows;
