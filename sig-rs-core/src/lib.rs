//! Core types shared by the `sig-rs` crates.
//!
//! Holds the crate-wide [`Error`] type and the small numeric helpers in
//! [`num_rs`] that both the spectral and smoothing code build upon.

#![deny(missing_docs)]

extern crate alloc;

mod error;

/// Numeric array helpers in the spirit of numpy.
pub mod num_rs;

pub use error::Error;

/// Result alias used across `sig-rs`.
pub type Result<T> = core::result::Result<T, Error>;
