//! Tier-dispatching media store.

use crate::{
    BlobId, ChunkedBlob, ChunkedBlobStore, DEFAULT_CHUNK_SIZE, DEFAULT_CONTENT_TYPE, InlineBlob,
    InlineBlobStore, MediaReference, MediaUpload, MemoryChunkedStore, MemoryInlineStore,
    StorageKind, StorageResult, StoredMedia, TierPolicy, sanitize_filename,
};
use campusconnect_error::{StorageError, StorageErrorKind};
use std::sync::Arc;

/// Outcome of best-effort cleanup for an owner record's media.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Blobs that existed and were removed
    pub removed: usize,
    /// References whose blob was already gone
    pub missing: usize,
    /// Deletions that failed and were logged
    pub failed: usize,
}

/// Uniform store, retrieve, and delete over an inline and a chunked backend.
///
/// The store holds shared handles to both backends and never manages their
/// connections. It performs no retries: a failed write surfaces immediately,
/// so no duplicate blob can be created behind the caller's back.
///
/// # Example
///
/// ```rust
/// use campusconnect_storage::{MediaStore, MediaUpload, StorageHint, StorageKind};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MediaStore::in_memory();
///
/// let upload = MediaUpload::new(vec![0xFFu8; 2048], "photo.jpg", "image/jpeg", StorageHint::Image);
/// let reference = store.store(upload).await?;
/// assert_eq!(reference.kind, StorageKind::Inline);
///
/// let media = store.retrieve(&reference).await?;
/// assert_eq!(media.content_type(), "image/jpeg");
///
/// assert!(store.delete(&reference).await?);
/// assert!(!store.delete(&reference).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MediaStore {
    inline: Arc<dyn InlineBlobStore>,
    chunked: Arc<dyn ChunkedBlobStore>,
    policy: TierPolicy,
    chunk_size: usize,
    base_url: String,
}

impl std::fmt::Debug for MediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStore")
            .field("inline", &self.inline.backend_name())
            .field("chunked", &self.chunked.backend_name())
            .field("policy", &self.policy)
            .field("chunk_size", &self.chunk_size)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MediaStore {
    /// Create a store over the given backends with default policy.
    pub fn new(inline: Arc<dyn InlineBlobStore>, chunked: Arc<dyn ChunkedBlobStore>) -> Self {
        Self {
            inline,
            chunked,
            policy: TierPolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            base_url: String::new(),
        }
    }

    /// Create a store backed entirely by process memory.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryInlineStore::new()),
            Arc::new(MemoryChunkedStore::new()),
        )
    }

    /// Set the chunk size used for new chunked blobs.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the tier policy.
    pub fn with_policy(mut self, policy: TierPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the prefix prepended to retrieval URLs (e.g. `https://campus.example/api`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Chunk size for new chunked blobs.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Tier policy in effect.
    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// Build the reference for an existing blob.
    pub fn reference_for(&self, id: BlobId, kind: StorageKind) -> MediaReference {
        MediaReference::new(id, kind, &self.base_url)
    }

    /// Persist an upload and return its reference.
    ///
    /// The filename is sanitized, an empty content type becomes
    /// `application/octet-stream`, and the tier is chosen once by the
    /// [`TierPolicy`].
    ///
    /// # Errors
    ///
    /// - Invalid input if the filename sanitizes to nothing
    /// - Storage write error if the backend write fails
    #[tracing::instrument(
        skip(self, upload),
        fields(filename = %upload.filename(), size = upload.data().len(), hint = %upload.hint())
    )]
    pub async fn store(&self, upload: MediaUpload) -> StorageResult<MediaReference> {
        let (data, raw_filename, content_type, hint) = upload.into_parts();

        let filename = sanitize_filename(&raw_filename)?;
        let content_type = if content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            content_type
        };

        let size = data.len();
        let kind = self.policy.select(hint, &filename, size as u64);
        let id = BlobId::new();

        match kind {
            StorageKind::Inline => {
                let blob = InlineBlob::new(id, data, filename.clone(), content_type.clone());
                self.inline.insert(blob).await?;
            }
            StorageKind::Chunked => {
                let blob = ChunkedBlob::split(
                    id,
                    &data,
                    filename.clone(),
                    content_type.clone(),
                    self.chunk_size,
                );
                self.chunked.insert(blob).await?;
            }
        }

        let reference = self.reference_for(id, kind);
        tracing::info!(
            id = %id,
            kind = %kind,
            size,
            filename = %filename,
            content_type = %content_type,
            url = %reference.url,
            "Stored media"
        );
        Ok(reference)
    }

    /// Retrieve the payload behind a reference.
    ///
    /// # Errors
    ///
    /// - Not found if the tier named by the reference has no such blob
    /// - Storage read error on backend failure or corrupt chunks
    #[tracing::instrument(skip(self, reference), fields(id = %reference.id, kind = %reference.kind))]
    pub async fn retrieve(&self, reference: &MediaReference) -> StorageResult<StoredMedia> {
        self.fetch_from(reference.id, reference.kind)
            .await?
            .ok_or_else(|| not_found(reference.id, Some(reference.kind)))
    }

    /// Retrieve by bare id, for records that predate the kind tag.
    ///
    /// With a kind this behaves like [`MediaStore::retrieve`]. Without one,
    /// the inline tier is probed first, then the chunked tier.
    ///
    /// # Errors
    ///
    /// - Invalid reference if `id` is malformed
    /// - Not found if neither tier holds the id
    #[tracing::instrument(skip(self))]
    pub async fn retrieve_by_id(
        &self,
        id: &str,
        kind: Option<StorageKind>,
    ) -> StorageResult<StoredMedia> {
        let id = BlobId::parse(id)?;

        if let Some(kind) = kind {
            return self
                .fetch_from(id, kind)
                .await?
                .ok_or_else(|| not_found(id, Some(kind)));
        }

        if let Some(media) = self.fetch_from(id, StorageKind::Inline).await? {
            return Ok(media);
        }
        tracing::debug!(id = %id, "Not in inline tier, probing chunked tier");
        self.fetch_from(id, StorageKind::Chunked)
            .await?
            .ok_or_else(|| not_found(id, None))
    }

    /// Delete the blob behind a reference.
    ///
    /// Returns `false` when nothing was stored under the reference, so owner
    /// deletion paths can call this unconditionally.
    ///
    /// # Errors
    ///
    /// Storage write error if the backend fails.
    #[tracing::instrument(skip(self, reference), fields(id = %reference.id, kind = %reference.kind))]
    pub async fn delete(&self, reference: &MediaReference) -> StorageResult<bool> {
        self.remove_from(reference.id, reference.kind).await
    }

    /// Delete by bare id; without a kind, tries inline then chunked.
    ///
    /// # Errors
    ///
    /// - Invalid reference if `id` is malformed
    /// - Storage write error if a backend fails
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str, kind: Option<StorageKind>) -> StorageResult<bool> {
        let id = BlobId::parse(id)?;

        match kind {
            Some(kind) => self.remove_from(id, kind).await,
            None => {
                if self.remove_from(id, StorageKind::Inline).await? {
                    return Ok(true);
                }
                self.remove_from(id, StorageKind::Chunked).await
            }
        }
    }

    /// Whether the blob behind a reference is present.
    ///
    /// # Errors
    ///
    /// Storage read error if the backend fails.
    pub async fn exists(&self, reference: &MediaReference) -> StorageResult<bool> {
        match reference.kind {
            StorageKind::Inline => self.inline.contains(reference.id).await,
            StorageKind::Chunked => self.chunked.contains(reference.id).await,
        }
    }

    /// Best-effort deletion of every blob an owner record references.
    ///
    /// Never fails: each failure is logged and counted, and the remaining
    /// references are still processed.
    #[tracing::instrument(skip(self, references))]
    pub async fn release<'a, I>(&self, references: I) -> ReleaseReport
    where
        I: IntoIterator<Item = &'a MediaReference>,
    {
        let mut report = ReleaseReport::default();

        for reference in references {
            match self.delete(reference).await {
                Ok(true) => report.removed += 1,
                Ok(false) => {
                    tracing::debug!(id = %reference.id, "Referenced media already absent");
                    report.missing += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        id = %reference.id,
                        kind = %reference.kind,
                        error = %e,
                        "Failed to delete referenced media"
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn fetch_from(&self, id: BlobId, kind: StorageKind) -> StorageResult<Option<StoredMedia>> {
        let media = match kind {
            StorageKind::Inline => self.inline.fetch(id).await?.map(InlineBlob::into_stored),
            StorageKind::Chunked => match self.chunked.fetch(id).await? {
                Some(blob) => Some(blob.into_stored()?),
                None => None,
            },
        };

        if let Some(media) = &media {
            tracing::debug!(id = %id, kind = %kind, size = media.data().len(), "Retrieved media");
        }
        Ok(media)
    }

    async fn remove_from(&self, id: BlobId, kind: StorageKind) -> StorageResult<bool> {
        let removed = match kind {
            StorageKind::Inline => self.inline.remove(id).await?,
            StorageKind::Chunked => self.chunked.remove(id).await?,
        };

        if removed {
            tracing::info!(id = %id, kind = %kind, "Deleted media");
        } else {
            tracing::debug!(id = %id, kind = %kind, "Delete found nothing to remove");
        }
        Ok(removed)
    }
}

#[track_caller]
fn not_found(id: BlobId, kind: Option<StorageKind>) -> StorageError {
    let target = match kind {
        Some(kind) => format!("{} blob {}", kind, id),
        None => format!("blob {}", id),
    };
    StorageError::new(StorageErrorKind::NotFound(target))
}
