use core::fmt;

/// Validation errors raised at kernel construction or adapter binding time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input or configuration field is empty.
    EmptyInput {
        /// Name of the argument that is empty.
        arg: &'static str,
    },
    /// A configuration argument value is invalid.
    InvalidArgument {
        /// Name of the argument.
        arg: &'static str,
        /// Human readable reason.
        reason: &'static str,
    },
    /// An optional configuration field required by the selected mode was absent.
    MissingArgument {
        /// Name of the absent argument.
        arg: &'static str,
    },
    /// A contiguous 1D slice view could not be obtained.
    NonContiguous {
        /// Name of the argument that is non-contiguous.
        arg: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyInput { arg } => write!(f, "`{arg}` must not be empty"),
            ConfigError::InvalidArgument { arg, reason } => write!(f, "`{arg}` rejected: {reason}"),
            ConfigError::MissingArgument { arg } => {
                write!(f, "`{arg}` must be set for the selected filter type")
            }
            ConfigError::NonContiguous { arg } => write!(f, "`{arg}` has a strided layout"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failures detected while running an already validated kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInvariantViolation {
    /// The kernel could not produce a result for this input.
    InvalidState {
        /// Human readable reason.
        reason: &'static str,
    },
    /// A buffer did not have the length the kernel requires.
    LengthMismatch {
        /// Name of the argument.
        arg: &'static str,
        /// Required length.
        expected: usize,
        /// Received length.
        got: usize,
    },
    /// An input or output adapter could not be bound.
    Config(ConfigError),
}

impl From<ConfigError> for ExecInvariantViolation {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl fmt::Display for ExecInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecInvariantViolation::InvalidState { reason } => write!(f, "kernel failed: {reason}"),
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                write!(f, "`{arg}` holds {got} samples, kernel needs {expected}")
            }
            ExecInvariantViolation::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ExecInvariantViolation {}

impl From<ConfigError> for sig_rs_core::Error {
    fn from(value: ConfigError) -> Self {
        use sig_rs_core::Error;
        match value {
            ConfigError::EmptyInput { arg } => Error::EmptyInput { arg: arg.into() },
            ConfigError::InvalidArgument { arg, reason } => Error::invalid_arg(arg, reason),
            ConfigError::MissingArgument { arg } => Error::invalid_arg(arg, "argument is required"),
            ConfigError::NonContiguous { arg } => Error::invalid_arg(arg, "strided layout"),
        }
    }
}

impl From<ExecInvariantViolation> for sig_rs_core::Error {
    fn from(value: ExecInvariantViolation) -> Self {
        use sig_rs_core::Error;
        match value {
            ExecInvariantViolation::InvalidState { reason } => Error::ExecInvariantViolation {
                reason: reason.into(),
            },
            ExecInvariantViolation::LengthMismatch { arg, expected, got } => {
                Error::LengthMismatch {
                    arg: arg.into(),
                    expected,
                    got,
                }
            }
            ExecInvariantViolation::Config(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ExecInvariantViolation};

    #[test]
    fn config_errors_map_into_crate_error() {
        let err: sig_rs_core::Error = ConfigError::MissingArgument {
            arg: "cutoff_frequency2",
        }
        .into();
        assert!(matches!(
            err,
            sig_rs_core::Error::InvalidArg { ref arg, .. } if arg == "cutoff_frequency2"
        ));
    }

    #[test]
    fn exec_errors_unwrap_nested_config() {
        let err: sig_rs_core::Error =
            ExecInvariantViolation::Config(ConfigError::EmptyInput { arg: "data" }).into();
        assert_eq!(
            err,
            sig_rs_core::Error::EmptyInput {
                arg: "data".into()
            }
        );

        let err: sig_rs_core::Error = ExecInvariantViolation::LengthMismatch {
            arg: "buf",
            expected: 8,
            got: 6,
        }
        .into();
        assert!(matches!(err, sig_rs_core::Error::LengthMismatch { expected: 8, got: 6, .. }));
    }
}
