//! Upload categories and their size and extension limits.
//!
//! Limits are enforced by callers before [`MediaStore::store`](crate::MediaStore::store);
//! the store itself accepts any payload it is handed.

use crate::StorageHint;
use crate::filename::extension;
use campusconnect_error::{StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Owner-record slot an upload fills.
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
#[serde(rename_all = "snake_case")]
pub enum UploadCategory {
    /// User avatar or background image
    #[display("profile_image")]
    ProfileImage,
    /// Image attached to a feed post
    #[display("post_image")]
    PostImage,
    /// Image attached to a comment
    #[display("comment_image")]
    CommentImage,
    /// Document attached to a feed post
    #[display("post_attachment")]
    PostAttachment,
    /// Shared study resource
    #[display("resource")]
    Resource,
}

/// Size and extension bucket for an upload category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SizeClass {
    /// Pictures
    #[display("image")]
    Image,
    /// Attachments
    #[display("document")]
    Document,
    /// Shared resources, archives included
    #[display("resource")]
    Resource,
}

impl UploadCategory {
    /// Tier hint passed to the store for this category.
    pub fn hint(&self) -> StorageHint {
        match self {
            UploadCategory::ProfileImage
            | UploadCategory::PostImage
            | UploadCategory::CommentImage => StorageHint::Image,
            UploadCategory::PostAttachment | UploadCategory::Resource => StorageHint::Document,
        }
    }

    /// Bucket used to look up limits.
    pub fn size_class(&self) -> SizeClass {
        match self {
            UploadCategory::ProfileImage
            | UploadCategory::PostImage
            | UploadCategory::CommentImage => SizeClass::Image,
            UploadCategory::PostAttachment => SizeClass::Document,
            UploadCategory::Resource => SizeClass::Resource,
        }
    }

    /// Convert to the path segment used by upload routes.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadCategory::ProfileImage => "profile_image",
            UploadCategory::PostImage => "post_image",
            UploadCategory::CommentImage => "comment_image",
            UploadCategory::PostAttachment => "post_attachment",
            UploadCategory::Resource => "resource",
        }
    }
}

impl std::str::FromStr for UploadCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile_image" => Ok(UploadCategory::ProfileImage),
            "post_image" => Ok(UploadCategory::PostImage),
            "comment_image" => Ok(UploadCategory::CommentImage),
            "post_attachment" => Ok(UploadCategory::PostAttachment),
            "resource" => Ok(UploadCategory::Resource),
            _ => Err(format!("Unknown upload category: {}", s)),
        }
    }
}

/// Per-class byte bounds and allowed extensions.
///
/// Deserializable so the server can load it from the `[limits]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    /// Bound for images (default 10 MiB)
    pub max_image_bytes: u64,
    /// Bound for document attachments (default 25 MiB)
    pub max_document_bytes: u64,
    /// Bound for shared resources (default 50 MiB)
    pub max_resource_bytes: u64,
    /// Allowed image extensions
    pub image_extensions: Vec<String>,
    /// Allowed document extensions
    pub document_extensions: Vec<String>,
    /// Allowed resource extensions
    pub resource_extensions: Vec<String>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for UploadLimits {
    fn default() -> Self {
        let documents = ["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt"];
        let mut resources = owned(&documents);
        resources.extend(owned(&["zip", "rar"]));

        Self {
            max_image_bytes: 10 * MIB,
            max_document_bytes: 25 * MIB,
            max_resource_bytes: 50 * MIB,
            image_extensions: owned(crate::IMAGE_EXTENSIONS),
            document_extensions: owned(&documents),
            resource_extensions: resources,
        }
    }
}

impl UploadLimits {
    /// Byte bound for a category.
    pub fn max_bytes(&self, category: UploadCategory) -> u64 {
        match category.size_class() {
            SizeClass::Image => self.max_image_bytes,
            SizeClass::Document => self.max_document_bytes,
            SizeClass::Resource => self.max_resource_bytes,
        }
    }

    /// Allowed extensions for a category.
    pub fn allowed_extensions(&self, category: UploadCategory) -> &[String] {
        match category.size_class() {
            SizeClass::Image => &self.image_extensions,
            SizeClass::Document => &self.document_extensions,
            SizeClass::Resource => &self.resource_extensions,
        }
    }

    /// Largest bound across all classes, used to size request body limits.
    pub fn largest_bound(&self) -> u64 {
        self.max_image_bytes
            .max(self.max_document_bytes)
            .max(self.max_resource_bytes)
    }

    /// Check the filename's extension against the category, returning it.
    ///
    /// # Errors
    ///
    /// Invalid input when the extension is missing or not allowed.
    #[track_caller]
    pub fn check_extension(
        &self,
        category: UploadCategory,
        filename: &str,
    ) -> Result<String, StorageError> {
        let allowed = self.allowed_extensions(category);
        match extension(filename) {
            Some(ext) if allowed.iter().any(|a| a.eq_ignore_ascii_case(&ext)) => Ok(ext),
            _ => Err(StorageError::invalid_input(format!(
                "{} type not allowed. Allowed types: {}",
                category.size_class(),
                allowed.join(", ")
            ))),
        }
    }

    /// Check a payload length against the category bound.
    ///
    /// # Errors
    ///
    /// [`StorageErrorKind::PayloadTooLarge`] when `len` exceeds the bound.
    #[track_caller]
    pub fn check_size(&self, category: UploadCategory, len: u64) -> Result<(), StorageError> {
        let limit = self.max_bytes(category);
        if len > limit {
            return Err(StorageError::new(StorageErrorKind::PayloadTooLarge {
                limit,
                received: len,
            }));
        }
        Ok(())
    }

    /// Validate both extension and declared length.
    ///
    /// # Examples
    ///
    /// ```
    /// use campusconnect_storage::{UploadCategory, UploadLimits};
    ///
    /// let limits = UploadLimits::default();
    /// assert!(limits.validate(UploadCategory::Resource, "notes.zip", 1024).is_ok());
    /// assert!(limits.validate(UploadCategory::PostAttachment, "notes.zip", 1024).is_err());
    /// assert!(limits.validate(UploadCategory::PostImage, "cat.png", 11 * 1024 * 1024).is_err());
    /// ```
    #[track_caller]
    pub fn validate(
        &self,
        category: UploadCategory,
        filename: &str,
        declared_len: u64,
    ) -> Result<(), StorageError> {
        self.check_extension(category, filename)?;
        self.check_size(category, declared_len)
    }
}
