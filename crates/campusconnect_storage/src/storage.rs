//! Backend trait definitions, one per storage tier.

use crate::{BlobId, ChunkedBlob, InlineBlob};
use campusconnect_error::StorageError;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend holding whole payloads as single documents.
///
/// Implementations must make `insert` atomic: a blob is either fully
/// present or absent. Ids are never overwritten.
#[async_trait::async_trait]
pub trait InlineBlobStore: Send + Sync {
    /// Backend name for logs (e.g., "memory", "postgres").
    fn backend_name(&self) -> &'static str;

    /// Persist a new blob.
    ///
    /// # Errors
    ///
    /// Storage write error if the backend fails or the id already exists.
    async fn insert(&self, blob: InlineBlob) -> StorageResult<()>;

    /// Load a blob, `None` if absent.
    async fn fetch(&self, id: BlobId) -> StorageResult<Option<InlineBlob>>;

    /// Remove a blob, returning whether it existed.
    async fn remove(&self, id: BlobId) -> StorageResult<bool>;

    /// Check presence without loading the payload.
    async fn contains(&self, id: BlobId) -> StorageResult<bool>;
}

/// Backend holding payloads as ordered chunks plus a header.
///
/// Header and chunks must become visible together: a reader never observes
/// a header without all of its chunks.
#[async_trait::async_trait]
pub trait ChunkedBlobStore: Send + Sync {
    /// Backend name for logs (e.g., "memory", "filesystem", "postgres").
    fn backend_name(&self) -> &'static str;

    /// Persist a new blob with all of its chunks.
    ///
    /// # Errors
    ///
    /// Storage write error if the backend fails or the id already exists.
    async fn insert(&self, blob: ChunkedBlob) -> StorageResult<()>;

    /// Load a blob with its chunks in order, `None` if absent.
    async fn fetch(&self, id: BlobId) -> StorageResult<Option<ChunkedBlob>>;

    /// Remove a blob and its chunks, returning whether it existed.
    async fn remove(&self, id: BlobId) -> StorageResult<bool>;

    /// Check presence without loading chunks.
    async fn contains(&self, id: BlobId) -> StorageResult<bool>;
}
