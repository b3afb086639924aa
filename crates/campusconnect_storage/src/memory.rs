//! In-process backends for development and tests.

use crate::{BlobId, ChunkedBlob, ChunkedBlobStore, InlineBlob, InlineBlobStore, StorageResult};
use campusconnect_error::StorageError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Inline tier kept in a shared map.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryInlineStore {
    blobs: Arc<RwLock<HashMap<BlobId, InlineBlob>>>,
}

impl MemoryInlineStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl InlineBlobStore for MemoryInlineStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    #[tracing::instrument(skip(self, blob), fields(id = %blob.id, size = blob.data.len()))]
    async fn insert(&self, blob: InlineBlob) -> StorageResult<()> {
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(&blob.id) {
            return Err(StorageError::write(format!("blob {} already exists", blob.id)));
        }
        blobs.insert(blob.id, blob);
        Ok(())
    }

    async fn fetch(&self, id: BlobId) -> StorageResult<Option<InlineBlob>> {
        Ok(self.blobs.read().await.get(&id).cloned())
    }

    async fn remove(&self, id: BlobId) -> StorageResult<bool> {
        Ok(self.blobs.write().await.remove(&id).is_some())
    }

    async fn contains(&self, id: BlobId) -> StorageResult<bool> {
        Ok(self.blobs.read().await.contains_key(&id))
    }
}

/// Chunked tier kept in a shared map.
#[derive(Debug, Clone, Default)]
pub struct MemoryChunkedStore {
    blobs: Arc<RwLock<HashMap<BlobId, ChunkedBlob>>>,
}

impl MemoryChunkedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ChunkedBlobStore for MemoryChunkedStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    #[tracing::instrument(skip(self, blob), fields(id = %blob.header.id, chunks = blob.header.chunk_count))]
    async fn insert(&self, blob: ChunkedBlob) -> StorageResult<()> {
        let mut blobs = self.blobs.write().await;
        if blobs.contains_key(&blob.header.id) {
            return Err(StorageError::write(format!(
                "blob {} already exists",
                blob.header.id
            )));
        }
        blobs.insert(blob.header.id, blob);
        Ok(())
    }

    async fn fetch(&self, id: BlobId) -> StorageResult<Option<ChunkedBlob>> {
        Ok(self.blobs.read().await.get(&id).cloned())
    }

    async fn remove(&self, id: BlobId) -> StorageResult<bool> {
        Ok(self.blobs.write().await.remove(&id).is_some())
    }

    async fn contains(&self, id: BlobId) -> StorageResult<bool> {
        Ok(self.blobs.read().await.contains_key(&id))
    }
}
