//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{ConfigError, GeneratorError, StoreError, WorkflowError};

/// Every error condition the Quill workspace can surface.
///
/// # Examples
///
/// ```
/// use quill_error::{QuillError, QuillErrorKind, StoreError, StoreErrorKind};
///
/// let store_err = StoreError::new(StoreErrorKind::Unavailable("pool closed".into()));
/// let err: QuillError = store_err.into();
/// assert!(matches!(err.kind(), QuillErrorKind::Store(_)));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum QuillErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Relational store error
    #[from(StoreError)]
    Store(StoreError),
    /// Workflow engine error
    #[from(WorkflowError)]
    Workflow(WorkflowError),
    /// Content generator error
    #[from(GeneratorError)]
    Generator(GeneratorError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Quill error with kind discrimination.
///
/// # Examples
///
/// ```
/// use quill_error::{QuillResult, ConfigError};
///
/// fn might_fail() -> QuillResult<()> {
///     Err(ConfigError::invalid("chapters must be greater than 0"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Quill Error: {}", _0)]
pub struct QuillError(Box<QuillErrorKind>);

impl QuillError {
    /// Create a new error from a kind.
    pub fn new(kind: QuillErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &QuillErrorKind {
        &self.0
    }

    /// True if this is the engine's step-budget circuit breaker.
    pub fn is_step_budget(&self) -> bool {
        matches!(self.kind(), QuillErrorKind::Workflow(e) if e.is_step_budget())
    }
}

// Generic From implementation for any type that converts to QuillErrorKind
impl<T> From<T> for QuillError
where
    T: Into<QuillErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Quill operations.
pub type QuillResult<T> = std::result::Result<T, QuillError>;
