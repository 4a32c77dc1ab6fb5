use super::ConfigError;

/// Constructor validation lifecycle shared by kernel structs.
///
/// A kernel that exists is a kernel whose config was accepted, so run-time
/// entrypoints only re-check properties of their inputs.
pub trait KernelLifecycle: Sized {
    /// Kernel config type.
    type Config;

    /// Construct a validated kernel from config.
    fn try_new(config: Self::Config) -> Result<Self, ConfigError>;
}

/// Reject non-finite or non-positive rates such as `sample_rate`.
pub(crate) fn ensure_positive(arg: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "must be finite and greater than zero",
        });
    }
    Ok(())
}

/// Reject NaN and infinities.
pub(crate) fn ensure_finite(arg: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::InvalidArgument {
            arg,
            reason: "must be finite",
        });
    }
    Ok(())
}
