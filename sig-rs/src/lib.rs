//! Signal analysis for test-and-measurement hosts.
//!
//! `sig-rs` synthesizes waveforms and noise, runs FFT based spectral
//! analysis, designs and runs IIR filters, and summarizes sample sets
//! statistically. Inputs are `f64` sample slices plus small configuration
//! records and outputs are plain result records.
//!
//! Every operation is exposed twice: as a kernel built through
//! [`kernel::KernelLifecycle::try_new`] and run through the capability traits
//! in [`signal::traits`], and as a convenience free function that builds the
//! kernel and returns [`Result`].
//!
//! ```
//! use sig_rs::signal::spectral::find_peaks;
//! use sig_rs::signal::wave::{sine, SignalConfig};
//!
//! let tone = sine(SignalConfig::new(1024.0, 1.0).with_frequency(64.0)).unwrap();
//! let peaks = find_peaks(&tone, 1024.0, 0.5).unwrap();
//! assert_eq!(peaks[0].frequency, 64.0);
//! ```

#![deny(missing_docs)]

/// Config-validated kernel substrate shared by every operation.
pub mod kernel;

/// Waveforms, noise, windows, spectra and filters.
pub mod signal;

/// Special mathematical functions.
pub mod special;

/// Descriptive statistics, regression and scaling.
pub mod stats;

pub use sig_rs_core::{Error, Result};

/// Linear algebra backend.
pub use nalgebra as na;
