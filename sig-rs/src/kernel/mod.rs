//! Shared trait-first kernel substrate.
//!
//! Every analysis operation in this crate is available as a kernel: a struct
//! built from a plain config record through [`KernelLifecycle::try_new`], which
//! validates the config once, and then run against any [`Read1D`] input.

mod errors;
mod io;
mod lifecycle;

pub use errors::*;
pub(crate) use io::read_non_empty;
pub use io::{Read1D, SampleStream, Write1D};
pub use lifecycle::KernelLifecycle;
pub(crate) use lifecycle::{ensure_finite, ensure_positive};
