//! Physical blob records for the two storage tiers.

use crate::{BlobId, StorageKind, StoredMedia};
use campusconnect_error::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default chunk size (255 KiB), matching the GridFS convention.
pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

/// Payload stored as a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineBlob {
    /// Blob identifier
    pub id: BlobId,
    /// Raw bytes
    pub data: Vec<u8>,
    /// Sanitized filename
    pub filename: String,
    /// MIME type supplied at upload
    pub content_type: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl InlineBlob {
    /// Create a new inline blob stamped with the current time.
    pub fn new(
        id: BlobId,
        data: Vec<u8>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id,
            data,
            filename: filename.into(),
            content_type: content_type.into(),
            created_at: Utc::now(),
        }
    }

    /// Convert into the caller-facing payload.
    pub fn into_stored(self) -> StoredMedia {
        StoredMedia::new(
            self.id,
            StorageKind::Inline,
            self.data,
            self.content_type,
            self.filename,
        )
    }
}

/// Metadata of a chunked blob, stored apart from its chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkedBlobHeader {
    /// Blob identifier
    pub id: BlobId,
    /// Sanitized filename
    pub filename: String,
    /// MIME type supplied at upload
    pub content_type: String,
    /// Total payload length in bytes
    pub length: u64,
    /// Size of every chunk but the last
    pub chunk_size: u32,
    /// Number of chunks
    pub chunk_count: u32,
    /// Hex SHA-256 of the whole payload, checked on read
    pub sha256: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// One ordered slice of a chunked blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobChunk {
    /// Zero-based position
    pub n: u32,
    /// Chunk bytes
    pub data: Vec<u8>,
}

/// Payload split across ordered chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedBlob {
    /// Blob metadata
    pub header: ChunkedBlobHeader,
    /// Chunks in ascending `n` order
    pub chunks: Vec<BlobChunk>,
}

/// Compute the hex SHA-256 digest of data.
pub(crate) fn compute_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

impl ChunkedBlob {
    /// Split a payload into chunks of `chunk_size` bytes.
    ///
    /// An empty payload produces zero chunks.
    ///
    /// # Examples
    ///
    /// ```
    /// use campusconnect_storage::{BlobId, ChunkedBlob};
    ///
    /// let blob = ChunkedBlob::split(BlobId::new(), &[7u8; 10], "a.bin", "application/octet-stream", 4);
    /// assert_eq!(blob.header.chunk_count, 3);
    /// assert_eq!(blob.chunks[2].data.len(), 2);
    /// assert_eq!(blob.assemble().unwrap(), vec![7u8; 10]);
    /// ```
    pub fn split(
        id: BlobId,
        data: &[u8],
        filename: impl Into<String>,
        content_type: impl Into<String>,
        chunk_size: usize,
    ) -> Self {
        let chunk_size = chunk_size.clamp(1, u32::MAX as usize);

        let chunks: Vec<BlobChunk> = data
            .chunks(chunk_size)
            .enumerate()
            .map(|(n, slice)| BlobChunk {
                n: n as u32,
                data: slice.to_vec(),
            })
            .collect();

        Self {
            header: ChunkedBlobHeader {
                id,
                filename: filename.into(),
                content_type: content_type.into(),
                length: data.len() as u64,
                chunk_size: chunk_size as u32,
                chunk_count: chunks.len() as u32,
                sha256: compute_digest(data),
                created_at: Utc::now(),
            },
            chunks,
        }
    }

    /// Join the chunks back into the payload.
    ///
    /// # Errors
    ///
    /// Returns a storage read error if chunks are missing, out of order,
    /// mis-sized, or the digest does not match.
    #[track_caller]
    pub fn assemble(&self) -> Result<Vec<u8>, StorageError> {
        let header = &self.header;

        if self.chunks.len() as u64 != header.chunk_count as u64 {
            return Err(StorageError::read(format!(
                "blob {} is corrupt: expected {} chunks, found {}",
                header.id,
                header.chunk_count,
                self.chunks.len()
            )));
        }

        let mut data = Vec::with_capacity(header.length as usize);
        let last = self.chunks.len().saturating_sub(1);
        for (index, chunk) in self.chunks.iter().enumerate() {
            if chunk.n as usize != index {
                return Err(StorageError::read(format!(
                    "blob {} is corrupt: chunk {} found at position {}",
                    header.id, chunk.n, index
                )));
            }
            if index != last && chunk.data.len() != header.chunk_size as usize {
                return Err(StorageError::read(format!(
                    "blob {} is corrupt: chunk {} has {} bytes, expected {}",
                    header.id,
                    chunk.n,
                    chunk.data.len(),
                    header.chunk_size
                )));
            }
            data.extend_from_slice(&chunk.data);
        }

        if data.len() as u64 != header.length {
            return Err(StorageError::read(format!(
                "blob {} is corrupt: length {} does not match recorded {}",
                header.id,
                data.len(),
                header.length
            )));
        }

        let actual = compute_digest(&data);
        if actual != header.sha256 {
            return Err(StorageError::read(format!(
                "blob {} is corrupt: digest mismatch, expected {}, got {}",
                header.id, header.sha256, actual
            )));
        }

        Ok(data)
    }

    /// Assemble and convert into the caller-facing payload.
    ///
    /// # Errors
    ///
    /// See [`ChunkedBlob::assemble`].
    pub fn into_stored(self) -> Result<StoredMedia, StorageError> {
        let data = self.assemble()?;
        let ChunkedBlobHeader {
            id,
            filename,
            content_type,
            ..
        } = self.header;
        Ok(StoredMedia::new(
            id,
            StorageKind::Chunked,
            data,
            content_type,
            filename,
        ))
    }
}
