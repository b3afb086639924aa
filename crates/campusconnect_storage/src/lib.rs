//! Tiered media storage for CampusConnect.
//!
//! This crate decides, per uploaded file, whether to persist it as an inline
//! binary document or as a chunked blob, and exposes uniform retrieval and
//! deletion regardless of which representation was used.
//!
//! # Features
//!
//! - **Two tiers**: Small images stay inline for single-read serving; everything
//!   else is split into ordered chunks that avoid single-document size ceilings
//! - **Pluggable backends**: Trait-based abstraction per tier (memory, filesystem, PostgreSQL)
//! - **Legacy lookup**: Bare ids without a kind tag probe inline first, then chunked
//! - **Integrity**: Chunked blobs carry a SHA-256 digest verified on every read
//! - **Bounded uploads**: Streams are rejected as soon as they exceed their byte bound
//!
//! # Example
//!
//! ```rust
//! use campusconnect_storage::{MediaStore, MediaUpload, StorageHint, StorageKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MediaStore::in_memory();
//!
//! let upload = MediaUpload::new(vec![0u8; 4096], "notes.pdf", "application/pdf", StorageHint::Document);
//! let reference = store.store(upload).await?;
//! assert_eq!(reference.kind, StorageKind::Chunked);
//! assert!(reference.url.starts_with("/files/blob/"));
//!
//! let media = store.retrieve(&reference).await?;
//! assert_eq!(media.filename(), "notes.pdf");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blob;
mod filename;
mod filesystem;
mod id;
mod limits;
mod memory;
mod policy;
mod reference;
mod storage;
mod store;
mod stream;

pub use blob::{BlobChunk, ChunkedBlob, ChunkedBlobHeader, DEFAULT_CHUNK_SIZE, InlineBlob};
pub use campusconnect_error::{StorageError, StorageErrorKind};
pub use filename::{extension, sanitize_filename};
pub use filesystem::{FileSystemChunkedStore, FileSystemInlineStore};
pub use id::BlobId;
pub use limits::{SizeClass, UploadCategory, UploadLimits};
pub use memory::{MemoryChunkedStore, MemoryInlineStore};
pub use policy::{DEFAULT_INLINE_MAX_BYTES, IMAGE_EXTENSIONS, StorageHint, StorageKind, TierPolicy};
pub use reference::{DEFAULT_CONTENT_TYPE, MediaReference, MediaUpload, MediaUploadBuilder, StoredMedia};
pub use storage::{ChunkedBlobStore, InlineBlobStore, StorageResult};
pub use store::{MediaStore, ReleaseReport};
pub use stream::read_bounded;
