//! Database error types.

/// Database error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// Connection or pool checkout failed
    #[display("Database connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Database query error: {}", _0)]
    Query(String),
    /// Migration error
    #[display("Migration error: {}", _0)]
    Migration(String),
    /// Record not found
    #[display("Record not found")]
    NotFound,
}

/// Database error with source location tracking.
///
/// # Examples
///
/// ```
/// use campusconnect_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::NotFound);
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The kind of error that occurred
    pub kind: DatabaseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<diesel::result::Error> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => DatabaseError::new(DatabaseErrorKind::NotFound),
            _ => DatabaseError::new(DatabaseErrorKind::Query(err.to_string())),
        }
    }
}

impl From<diesel::ConnectionError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}

impl From<diesel::r2d2::PoolError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::r2d2::PoolError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}
