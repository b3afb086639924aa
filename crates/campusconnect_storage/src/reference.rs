//! Media reference and payload types.

use crate::{BlobId, StorageHint, StorageKind};
use campusconnect_error::{BuilderError, BuilderErrorKind};
use serde::{Deserialize, Serialize};

/// Content type used when the uploader declares none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Caller-visible handle to stored media.
///
/// Owner records (posts, comments, resources, profiles) embed this and hand
/// it back for retrieval and deletion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MediaReference {
    /// Blob identifier
    pub id: BlobId,
    /// Tier the blob lives in
    pub kind: StorageKind,
    /// Public retrieval URL
    pub url: String,
}

impl MediaReference {
    /// Build a reference, deriving the URL from `base_url`, kind, and id.
    ///
    /// # Examples
    ///
    /// ```
    /// use campusconnect_storage::{BlobId, MediaReference, StorageKind};
    ///
    /// let id = BlobId::new();
    /// let reference = MediaReference::new(id, StorageKind::Inline, "");
    /// assert_eq!(reference.url, format!("/files/image/{}", id));
    /// ```
    pub fn new(id: BlobId, kind: StorageKind, base_url: &str) -> Self {
        let url = format!(
            "{}/files/{}/{}",
            base_url.trim_end_matches('/'),
            kind.url_segment(),
            id
        );
        Self { id, kind, url }
    }
}

/// An upload handed to [`MediaStore::store`](crate::MediaStore::store).
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder, derive_getters::Getters)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct MediaUpload {
    /// Raw payload
    data: Vec<u8>,
    /// Client-supplied filename, sanitized by the store
    filename: String,
    /// Declared MIME type, trusted as given
    #[builder(default = "DEFAULT_CONTENT_TYPE.to_string()")]
    content_type: String,
    /// Expected tier
    #[builder(default)]
    hint: StorageHint,
}

impl MediaUploadBuilder {
    /// Build the MediaUpload.
    ///
    /// # Errors
    ///
    /// Returns error if `data` or `filename` is missing.
    pub fn build(&self) -> Result<MediaUpload, BuilderError> {
        self.build_internal()
            .map_err(|e| BuilderError::new(BuilderErrorKind::MissingField(e.to_string())))
    }
}

impl MediaUpload {
    /// Create an upload from its parts.
    pub fn new(
        data: impl Into<Vec<u8>>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        hint: StorageHint,
    ) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            hint,
        }
    }

    /// Decompose into `(data, filename, content_type, hint)`.
    pub fn into_parts(self) -> (Vec<u8>, String, String, StorageHint) {
        (self.data, self.filename, self.content_type, self.hint)
    }
}

/// Payload returned by retrieval, independent of the tier it came from.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct StoredMedia {
    /// Blob identifier
    id: BlobId,
    /// Tier the payload was read from
    kind: StorageKind,
    /// Full payload
    data: Vec<u8>,
    /// Stored MIME type
    content_type: String,
    /// Stored filename
    filename: String,
}

impl StoredMedia {
    /// Assemble a retrieval result.
    pub fn new(
        id: BlobId,
        kind: StorageKind,
        data: Vec<u8>,
        content_type: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            data,
            content_type: content_type.into(),
            filename: filename.into(),
        }
    }

    /// Take the payload bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
