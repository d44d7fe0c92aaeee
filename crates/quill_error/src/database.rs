//! PostgreSQL store errors.

/// Failure inside the PostgreSQL story store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// No connection could be made or checked out of the pool
    #[display("Connection failed: {}", _0)]
    Connection(String),
    /// A statement was rejected
    #[display("Statement failed: {}", _0)]
    Query(String),
    /// A JSON column could not be encoded or decoded
    #[display("JSON column error: {}", _0)]
    Serialization(String),
    /// A value does not fit its column type
    #[display("Column conversion failed: {}", _0)]
    Conversion(String),
    /// Embedded migrations could not be applied
    #[display("Migration failed: {}", _0)]
    Migration(String),
    /// A single-row lookup found nothing
    #[display("Row not found")]
    NotFound,
}

/// Database error with source location tracking.
///
/// # Examples
///
/// ```
/// use quill_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::Connection("refused".into()));
/// assert!(err.is_connection());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// What went wrong
    pub kind: DatabaseErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError at the caller's location.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True if the database could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self.kind, DatabaseErrorKind::Connection(_))
    }
}

impl From<diesel::result::Error> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match err {
            diesel::result::Error::NotFound => DatabaseErrorKind::NotFound,
            other => DatabaseErrorKind::Query(other.to_string()),
        };
        Self::new(kind)
    }
}

impl From<diesel::ConnectionError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}

impl From<serde_json::Error> for DatabaseError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(DatabaseErrorKind::Serialization(err.to_string()))
    }
}
