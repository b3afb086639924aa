//! Filesystem-based blob storage for both tiers.
//!
//! Each blob is a directory sharded by the first two hex characters of the
//! id. Chunked blobs hold a JSON manifest and one file per chunk; inline
//! blobs hold a JSON manifest and a single data file.

use crate::{
    BlobChunk, BlobId, ChunkedBlob, ChunkedBlobHeader, ChunkedBlobStore, InlineBlob,
    InlineBlobStore, StorageResult,
};
use campusconnect_error::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MANIFEST: &str = "manifest.json";
const INLINE_DATA: &str = "data.bin";

fn create_root(base_path: &Path) -> StorageResult<()> {
    std::fs::create_dir_all(base_path).map_err(|e| {
        StorageError::write(format!(
            "failed to create storage directory {}: {}",
            base_path.display(),
            e
        ))
    })
}

fn blob_dir(base_path: &Path, id: BlobId) -> PathBuf {
    base_path.join(id.shard()).join(id.to_string())
}

/// Scratch path beside the blob directory, hidden by its leading dot.
fn scratch_dir(base_path: &Path, id: BlobId, purpose: &str) -> PathBuf {
    base_path
        .join(id.shard())
        .join(format!(".{}.{}-{}", id, purpose, Uuid::new_v4().simple()))
}

async fn path_exists(path: &Path) -> StorageResult<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| StorageError::read(format!("{}: {}", path.display(), e)))
}

async fn write_file(path: &Path, data: &[u8]) -> StorageResult<()> {
    tokio::fs::write(path, data)
        .await
        .map_err(|e| StorageError::write(format!("write {}: {}", path.display(), e)))
}

/// Read a manifest, `None` when the blob directory has none.
async fn read_manifest<T: serde::de::DeserializeOwned>(dir: &Path) -> StorageResult<Option<T>> {
    let path = dir.join(MANIFEST);
    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::read(format!("{}: {}", path.display(), e))),
    };

    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|e| StorageError::read(format!("decode {}: {}", path.display(), e)))
}

/// Fill a staging directory, then rename it over `final_dir`.
///
/// Fails without touching anything if `final_dir` already exists.
async fn publish<F, Fut>(base_path: &Path, id: BlobId, fill: F) -> StorageResult<PathBuf>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: std::future::Future<Output = StorageResult<()>>,
{
    let final_dir = blob_dir(base_path, id);
    if path_exists(&final_dir).await? {
        return Err(StorageError::write(format!("blob {} already exists", id)));
    }

    let staging = scratch_dir(base_path, id, "tmp");
    tokio::fs::create_dir_all(&staging)
        .await
        .map_err(|e| StorageError::write(format!("create {}: {}", staging.display(), e)))?;

    if let Err(e) = fill(staging.clone()).await {
        let _ = tokio::fs::remove_dir_all(&staging).await;
        return Err(e);
    }

    if let Err(e) = tokio::fs::rename(&staging, &final_dir).await {
        let _ = tokio::fs::remove_dir_all(&staging).await;
        return Err(StorageError::write(format!(
            "rename {} to {}: {}",
            staging.display(),
            final_dir.display(),
            e
        )));
    }
    Ok(final_dir)
}

/// Rename a blob directory aside and delete it, returning whether it existed.
async fn unpublish(base_path: &Path, id: BlobId) -> StorageResult<bool> {
    let dir = blob_dir(base_path, id);
    let doomed = scratch_dir(base_path, id, "deleting");

    match tokio::fs::rename(&dir, &doomed).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(StorageError::write(format!(
                "delete {}: {}",
                dir.display(),
                e
            )));
        }
    }

    if let Err(e) = tokio::fs::remove_dir_all(&doomed).await {
        tracing::warn!(path = %doomed.display(), error = %e, "Failed to reclaim deleted blob files");
    }
    Ok(true)
}

/// Filesystem chunked-blob backend.
///
/// Stores blobs in the structure:
/// `{base_path}/{id[0:2]}/{id}/`
///
/// # Example Structure
///
/// ```text
/// /var/campusconnect/blobs/chunked/
/// ├── 3f/
/// │   └── 3f2a9c1e-.../
/// │       ├── manifest.json
/// │       ├── 000000.chunk
/// │       └── 000001.chunk
/// └── a7/
///     └── a7c04b12-.../
///         ├── manifest.json
///         └── 000000.chunk
/// ```
///
/// # Features
///
/// - **Atomic writes**: A blob is assembled in a temp directory, then renamed into place
/// - **Atomic deletes**: A blob is renamed aside before its files are removed
/// - **Sharded layout**: Prefix directories prevent directory bloat
pub struct FileSystemChunkedStore {
    base_path: PathBuf,
}

impl FileSystemChunkedStore {
    /// Create a new filesystem backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Root directory for chunked blobs
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        create_root(&base_path)?;

        tracing::info!(path = %base_path.display(), "Created filesystem blob storage");
        Ok(Self { base_path })
    }

    /// Root directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn chunk_path(dir: &Path, n: u32) -> PathBuf {
        dir.join(format!("{:06}.chunk", n))
    }

    async fn write_staged(staging: PathBuf, blob: &ChunkedBlob) -> StorageResult<()> {
        for chunk in &blob.chunks {
            write_file(&Self::chunk_path(&staging, chunk.n), &chunk.data).await?;
        }

        let manifest = serde_json::to_vec_pretty(&blob.header)
            .map_err(|e| StorageError::write(format!("encode manifest: {}", e)))?;
        write_file(&staging.join(MANIFEST), &manifest).await
    }
}

#[async_trait::async_trait]
impl ChunkedBlobStore for FileSystemChunkedStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    #[tracing::instrument(skip(self, blob), fields(id = %blob.header.id, size = blob.header.length))]
    async fn insert(&self, blob: ChunkedBlob) -> StorageResult<()> {
        let id = blob.header.id;
        let final_dir = publish(&self.base_path, id, |staging| {
            Self::write_staged(staging, &blob)
        })
        .await?;

        tracing::info!(
            id = %id,
            path = %final_dir.display(),
            chunks = blob.header.chunk_count,
            "Stored chunked blob"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn fetch(&self, id: BlobId) -> StorageResult<Option<ChunkedBlob>> {
        let dir = blob_dir(&self.base_path, id);
        let Some(header) = read_manifest::<ChunkedBlobHeader>(&dir).await? else {
            return Ok(None);
        };

        let mut chunks = Vec::with_capacity(header.chunk_count as usize);
        for n in 0..header.chunk_count {
            let path = Self::chunk_path(&dir, n);
            let data = tokio::fs::read(&path)
                .await
                .map_err(|e| StorageError::read(format!("{}: {}", path.display(), e)))?;
            chunks.push(BlobChunk { n, data });
        }

        tracing::debug!(id = %id, chunks = chunks.len(), "Loaded chunked blob");
        Ok(Some(ChunkedBlob { header, chunks }))
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn remove(&self, id: BlobId) -> StorageResult<bool> {
        let removed = unpublish(&self.base_path, id).await?;
        if removed {
            tracing::info!(id = %id, "Deleted chunked blob");
        }
        Ok(removed)
    }

    async fn contains(&self, id: BlobId) -> StorageResult<bool> {
        path_exists(&blob_dir(&self.base_path, id).join(MANIFEST)).await
    }
}

/// Metadata written beside an inline payload.
#[derive(Debug, Serialize, Deserialize)]
struct InlineManifest {
    id: BlobId,
    filename: String,
    content_type: String,
    length: u64,
    created_at: DateTime<Utc>,
}

/// Filesystem inline-blob backend.
///
/// One directory per blob under `{base_path}/{id[0:2]}/{id}/`, holding
/// `manifest.json` and `data.bin`. Writes and deletes use the same
/// stage-then-rename scheme as [`FileSystemChunkedStore`].
pub struct FileSystemInlineStore {
    base_path: PathBuf,
}

impl FileSystemInlineStore {
    /// Create a new filesystem backend, creating `base_path` if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        create_root(&base_path)?;

        tracing::info!(path = %base_path.display(), "Created filesystem inline storage");
        Ok(Self { base_path })
    }

    /// Root directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    async fn write_staged(staging: PathBuf, blob: &InlineBlob) -> StorageResult<()> {
        write_file(&staging.join(INLINE_DATA), &blob.data).await?;

        let manifest = InlineManifest {
            id: blob.id,
            filename: blob.filename.clone(),
            content_type: blob.content_type.clone(),
            length: blob.data.len() as u64,
            created_at: blob.created_at,
        };
        let manifest = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| StorageError::write(format!("encode manifest: {}", e)))?;
        write_file(&staging.join(MANIFEST), &manifest).await
    }
}

#[async_trait::async_trait]
impl InlineBlobStore for FileSystemInlineStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    #[tracing::instrument(skip(self, blob), fields(id = %blob.id, size = blob.data.len()))]
    async fn insert(&self, blob: InlineBlob) -> StorageResult<()> {
        let final_dir = publish(&self.base_path, blob.id, |staging| {
            Self::write_staged(staging, &blob)
        })
        .await?;

        tracing::info!(id = %blob.id, path = %final_dir.display(), "Stored inline blob");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn fetch(&self, id: BlobId) -> StorageResult<Option<InlineBlob>> {
        let dir = blob_dir(&self.base_path, id);
        let Some(manifest) = read_manifest::<InlineManifest>(&dir).await? else {
            return Ok(None);
        };

        let path = dir.join(INLINE_DATA);
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::read(format!("{}: {}", path.display(), e)))?;

        if data.len() as u64 != manifest.length {
            return Err(StorageError::read(format!(
                "inline blob {} is {} bytes, manifest says {}",
                id,
                data.len(),
                manifest.length
            )));
        }

        Ok(Some(InlineBlob {
            id: manifest.id,
            data,
            filename: manifest.filename,
            content_type: manifest.content_type,
            created_at: manifest.created_at,
        }))
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn remove(&self, id: BlobId) -> StorageResult<bool> {
        let removed = unpublish(&self.base_path, id).await?;
        if removed {
            tracing::info!(id = %id, "Deleted inline blob");
        }
        Ok(removed)
    }

    async fn contains(&self, id: BlobId) -> StorageResult<bool> {
        path_exists(&blob_dir(&self.base_path, id).join(MANIFEST)).await
    }
}
