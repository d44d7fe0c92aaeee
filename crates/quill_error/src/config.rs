//! Configuration and driver-input errors.

/// What was wrong with the configuration or the driver's input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration source could not be read or merged
    #[display("Cannot load configuration: {}", _0)]
    Load(String),
    /// A value is present but unusable
    #[display("Invalid setting: {}", _0)]
    Invalid(String),
    /// A result could not be written where the driver asked
    #[display("Cannot write output: {}", _0)]
    Output(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use quill_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Invalid("max_steps must be greater than 0".into()));
/// assert!(err.to_string().contains("Invalid setting"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// What went wrong
    pub kind: ConfigErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the caller's location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for [`ConfigErrorKind::Invalid`].
    #[track_caller]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid(reason.into()))
    }
}
