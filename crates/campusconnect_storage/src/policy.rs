//! Storage tier selection.
//!
//! The tier is resolved once, at store time, and carried in the
//! [`MediaReference`](crate::MediaReference) from then on.

use crate::filename::extension;
use campusconnect_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};

/// Extensions eligible for inline storage.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Largest payload kept inline by default (10 MiB).
pub const DEFAULT_INLINE_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Physical representation of a stored blob.
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
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Single document holding the whole payload
    #[display("inline")]
    Inline,
    /// Ordered chunks in the blob store
    #[display("chunked")]
    Chunked,
}

impl StorageKind {
    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Inline => "inline",
            StorageKind::Chunked => "chunked",
        }
    }

    /// Path segment used in retrieval URLs.
    pub fn url_segment(&self) -> &'static str {
        match self {
            StorageKind::Inline => "image",
            StorageKind::Chunked => "blob",
        }
    }

    /// Resolve a kind from a URL path segment or stored tag.
    ///
    /// `gridfs` is accepted for links minted before chunked blobs were
    /// served under `blob`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidReference`] for unknown segments.
    #[track_caller]
    pub fn from_segment(segment: &str) -> Result<Self, StorageError> {
        match segment.to_ascii_lowercase().as_str() {
            "image" | "inline" | "binary" => Ok(StorageKind::Inline),
            "blob" | "gridfs" | "chunked" => Ok(StorageKind::Chunked),
            other => Err(StorageError::new(StorageErrorKind::InvalidReference(
                format!("unknown storage kind '{}'", other),
            ))),
        }
    }
}

impl std::str::FromStr for StorageKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_segment(s)
    }
}

/// Caller's expectation of which tier a file belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum StorageHint {
    /// Small, frequently read picture
    #[display("image")]
    Image,
    /// Anything else: documents, archives, attachments
    #[default]
    #[display("document")]
    Document,
}

impl std::str::FromStr for StorageHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(StorageHint::Image),
            "document" => Ok(StorageHint::Document),
            _ => Err(format!("Unknown storage hint: {}", s)),
        }
    }
}

/// Two-tier placement rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierPolicy {
    /// Image payloads above this size fall back to chunked storage
    pub inline_max_bytes: u64,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            inline_max_bytes: DEFAULT_INLINE_MAX_BYTES,
        }
    }
}

impl TierPolicy {
    /// Pick the tier for an upload.
    ///
    /// Inline only when the hint is [`StorageHint::Image`], the extension is
    /// in [`IMAGE_EXTENSIONS`], and the payload fits the inline ceiling.
    ///
    /// # Examples
    ///
    /// ```
    /// use campusconnect_storage::{StorageHint, StorageKind, TierPolicy};
    ///
    /// let policy = TierPolicy::default();
    /// assert_eq!(policy.select(StorageHint::Image, "photo.JPG", 2048), StorageKind::Inline);
    /// assert_eq!(policy.select(StorageHint::Image, "scan.pdf", 2048), StorageKind::Chunked);
    /// assert_eq!(policy.select(StorageHint::Document, "photo.jpg", 2048), StorageKind::Chunked);
    /// ```
    pub fn select(&self, hint: StorageHint, filename: &str, len: u64) -> StorageKind {
        let image_ext = extension(filename)
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);

        if hint == StorageHint::Image && image_ext && len <= self.inline_max_bytes {
            StorageKind::Inline
        } else {
            StorageKind::Chunked
        }
    }
}
