//! IIR filter design and execution plus stateless smoothing.
//!
//! [`DigitalFilter`] is the only stateful object in the crate: it owns its
//! coefficients and two delay lines, and each processed sample advances them.

/// Butterworth design from a [`FilterConfig`].
pub mod design;

mod delay_line;
mod iir;
mod kernels;
mod savgol;
mod smoothing;

pub use design::{FilterConfig, FilterType, IirCoefficients};
pub use iir::*;
pub use kernels::*;
pub use savgol::savgol_coeffs;
pub use smoothing::*;
