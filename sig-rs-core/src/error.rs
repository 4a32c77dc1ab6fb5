use alloc::string::String;
use core::{error, fmt};

/// Error returned by every fallible `sig-rs` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A parameter was outside its accepted domain.
    InvalidArg {
        /// Parameter name.
        arg: String,
        /// What the parameter must satisfy.
        reason: String,
    },
    /// A required input was empty.
    EmptyInput {
        /// Name of the empty argument.
        arg: String,
    },
    /// Two inputs that must agree in length did not.
    LengthMismatch {
        /// Name of the offending argument.
        arg: String,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// A radix-2 transform was asked to run on a length that is not a power of two.
    NotPowerOfTwo {
        /// Received length.
        len: usize,
    },
    /// The convolution backend rejected its operands.
    Conv {
        /// Backend error message.
        reason: String,
    },
    /// Execution was attempted with a violated kernel invariant.
    ExecInvariantViolation {
        /// Why execution could not proceed.
        reason: String,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArg`].
    pub fn invalid_arg(arg: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArg {
            arg: arg.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArg { arg, reason } => write!(f, "invalid `{arg}`: {reason}"),
            Error::EmptyInput { arg } => write!(f, "`{arg}` must not be empty"),
            Error::LengthMismatch { arg, expected, got } => {
                write!(f, "`{arg}` has {got} samples, expected {expected}")
            }
            Error::NotPowerOfTwo { len } => write!(f, "length {len} is not a power of two"),
            Error::Conv { reason } => write!(f, "convolution failed: {reason}"),
            Error::ExecInvariantViolation { reason } => write!(f, "kernel failed: {reason}"),
        }
    }
}

impl error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::Error;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_argument() {
        let err = Error::invalid_arg("window", "must be odd");
        assert_eq!(err.to_string(), "invalid `window`: must be odd");

        let err = Error::NotPowerOfTwo { len: 12 };
        assert_eq!(err.to_string(), "length 12 is not a power of two");
    }
}
