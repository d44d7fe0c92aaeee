//! Content generator error types and retry classification.

/// Why a content generation attempt produced nothing usable.
///
/// This is a value, not an error to propagate: nodes match on it and
/// substitute their documented fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationFailure {
    /// The generator could not be reached or returned a transport error
    #[display("transport failure: {}", _0)]
    Transport(String),
    /// The generator returned no text
    #[display("empty response")]
    Empty,
    /// The response could not be parsed as the requested structure
    #[display("malformed response: {}", _0)]
    Malformed(String),
    /// The response parsed but did not satisfy the requested schema
    #[display("schema '{}' rejected response: {}", schema, reason)]
    SchemaRejected {
        /// Name of the schema that was requested
        schema: String,
        /// Why validation failed
        reason: String,
    },
}

/// Content generator backend failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GeneratorErrorKind {
    /// Request never produced an HTTP response (connect, timeout, reset)
    #[display("Transport error: {}", _0)]
    Transport(String),
    /// Backend answered with a non-success status
    #[display("API error (status {}): {}", status, message)]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },
    /// Response body could not be decoded
    #[display("Decode error: {}", _0)]
    Decode(String),
    /// Client is misconfigured
    #[display("Invalid configuration: {}", _0)]
    Configuration(String),
}

/// Error raised by a concrete content generator implementation.
///
/// # Examples
///
/// ```
/// use quill_error::{GeneratorError, GeneratorErrorKind, RetryableError};
///
/// let err = GeneratorError::new(GeneratorErrorKind::Status {
///     status: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
///
/// let err = GeneratorError::new(GeneratorErrorKind::Decode("bad json".to_string()));
/// assert!(!err.is_retryable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generator Error: {} at line {} in {}", kind, line, file)]
pub struct GeneratorError {
    /// The kind of error that occurred
    pub kind: GeneratorErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl GeneratorError {
    /// Create a new GeneratorError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GeneratorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60)
    }
}

impl RetryableError for GeneratorErrorKind {
    fn is_retryable(&self) -> bool {
        match self {
            GeneratorErrorKind::Transport(_) => true,
            GeneratorErrorKind::Status { status, .. } => {
                matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            GeneratorErrorKind::Decode(_) | GeneratorErrorKind::Configuration(_) => false,
        }
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            // Rate limit: back off hard
            GeneratorErrorKind::Status { status: 429, .. } => (5000, 3, 40),
            GeneratorErrorKind::Status { status: 503, .. } => (2000, 5, 60),
            GeneratorErrorKind::Status { .. } => (1000, 3, 8),
            _ => (2000, 3, 30),
        }
    }
}

impl RetryableError for GeneratorError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
