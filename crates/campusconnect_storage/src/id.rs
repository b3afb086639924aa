//! Blob identifiers.

use campusconnect_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier shared by inline and chunked blobs.
///
/// Rendered as a lowercase hyphenated UUID. Clients must treat it as an
/// opaque path segment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct BlobId(Uuid);

impl BlobId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id received from a URL or an owner record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidReference`] if `raw` is not a UUID.
    #[track_caller]
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        Uuid::parse_str(raw.trim()).map(Self).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidReference(format!(
                "'{}' is not a valid blob id: {}",
                raw, e
            )))
        })
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Two-character prefix used to shard directory-based backends.
    pub fn shard(&self) -> String {
        self.0.simple().to_string()[..2].to_string()
    }
}

impl Default for BlobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for BlobId {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
