mod convolve;
mod pad;

pub use convolve::*;
pub use pad::*;
