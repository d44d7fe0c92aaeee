//! Relational store error types.

/// Kinds of store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoreErrorKind {
    /// No durable store could be reached
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),
    /// A row expected by natural key was not present
    #[display("Record not found: {}", _0)]
    NotFound(String),
    /// A referenced parent row (chapter, character) does not exist
    #[display("Missing parent record: {}", _0)]
    MissingParent(String),
    /// A write was rejected by the store
    #[display("Write failed: {}", _0)]
    Write(String),
    /// A read query failed
    #[display("Query failed: {}", _0)]
    Query(String),
    /// A stored value could not be decoded into a domain type
    #[display("Corrupt value in column '{}': {}", column, value)]
    Corrupt {
        /// Column holding the value
        column: String,
        /// The offending value
        value: String,
    },
}

/// Store error with location tracking.
///
/// # Examples
///
/// ```
/// use quill_error::{StoreError, StoreErrorKind};
///
/// let err = StoreError::new(StoreErrorKind::NotFound("chapter 2".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Store Error: {} at line {} in {}", kind, line, file)]
pub struct StoreError {
    /// The kind of error that occurred
    pub kind: StoreErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoreError {
    /// Create a new store error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoreErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
