//! Media storage error types.

/// Kinds of media storage errors.
///
/// Each kind maps to one caller-visible failure class: rejected input,
/// a failed write, a failed read, an absent blob, or a malformed reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Malformed filename, disallowed extension, or unreadable upload
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
    /// Upload exceeded the configured byte bound
    #[display("Payload too large: {} bytes exceeds limit of {} bytes", received, limit)]
    PayloadTooLarge {
        /// Configured bound in bytes
        limit: u64,
        /// Bytes received before the upload was rejected
        received: u64,
    },
    /// The underlying store rejected or failed the write
    #[display("Storage write failed: {}", _0)]
    StorageWrite(String),
    /// The underlying store failed the read or returned corrupt data
    #[display("Storage read failed: {}", _0)]
    StorageRead(String),
    /// No blob with the given id exists in the addressed store
    #[display("Media not found: {}", _0)]
    NotFound(String),
    /// Malformed id or storage kind tag
    #[display("Invalid media reference: {}", _0)]
    InvalidReference(String),
    /// Caller exceeded the upload rate window
    #[display("Too many uploads: {}", _0)]
    Throttled(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use campusconnect_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("0b6f".to_string()));
/// assert!(format!("{}", err).contains("not found"));
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an [`StorageErrorKind::InvalidInput`] error.
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::InvalidInput(message.into()))
    }

    /// Shorthand for a [`StorageErrorKind::StorageWrite`] error.
    #[track_caller]
    pub fn write(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::StorageWrite(message.into()))
    }

    /// Shorthand for a [`StorageErrorKind::StorageRead`] error.
    #[track_caller]
    pub fn read(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::StorageRead(message.into()))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }

    /// Whether the addressed blob was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}
