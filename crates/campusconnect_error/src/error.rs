//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{BuilderError, ConfigError, ServerError, StorageError};

/// The foundation error enum, one variant per error family in the workspace.
///
/// # Examples
///
/// ```
/// use campusconnect_error::{CampusError, ConfigError};
///
/// let config_err = ConfigError::new("unknown storage backend");
/// let err: CampusError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CampusErrorKind {
    /// Media storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Builder error
    #[from(BuilderError)]
    Builder(BuilderError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// CampusConnect error with kind discrimination.
///
/// # Examples
///
/// ```
/// use campusconnect_error::{CampusResult, ConfigError};
///
/// fn might_fail() -> CampusResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("CampusConnect Error: {}", _0)]
pub struct CampusError(Box<CampusErrorKind>);

impl CampusError {
    /// Create a new error from a kind.
    pub fn new(kind: CampusErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CampusErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to CampusErrorKind
impl<T> From<T> for CampusError
where
    T: Into<CampusErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for CampusConnect operations.
///
/// # Examples
///
/// ```
/// use campusconnect_error::{CampusResult, StorageError};
///
/// fn store_blob() -> CampusResult<String> {
///     Err(StorageError::write("connection reset"))?
/// }
/// ```
pub type CampusResult<T> = std::result::Result<T, CampusError>;
