//! CampusConnect media store.
//!
//! CampusConnect stores the files attached to a campus social platform:
//! profile pictures, post and comment images, post attachments, and shared
//! study resources. Small images are kept inline for single-read serving;
//! everything else is split into chunks. Callers get back a tagged
//! reference and retrieve or delete through one uniform surface.
//!
//! # Quick Start
//!
//! ```rust
//! use campusconnect::{MediaStore, MediaUpload, StorageHint, StorageKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MediaStore::in_memory();
//!
//! let reference = store
//!     .store(MediaUpload::new(vec![0xFFu8; 2048], "photo.jpg", "image/jpeg", StorageHint::Image))
//!     .await?;
//! assert_eq!(reference.kind, StorageKind::Inline);
//!
//! let media = store.retrieve(&reference).await?;
//! assert_eq!(media.data().len(), 2048);
//! # Ok(())
//! # }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - Bridge tracing spans to OpenTelemetry (stdout exporter)
//!
//! # Architecture
//!
//! CampusConnect is organized as a workspace with focused crates:
//!
//! - `campusconnect_error` - Error types
//! - `campusconnect_storage` - Tier policy, blob types, media store, memory and filesystem backends
//! - `campusconnect_database` - PostgreSQL backends and migrations
//! - `campusconnect_server` - Configuration, upload throttle, HTTP routes
//!
//! This crate (`campusconnect`) re-exports everything for convenience.

mod observability;

pub use observability::{TelemetryGuard, init_logging};

// Re-export error types
pub use campusconnect_error::{
    BuilderError, BuilderErrorKind, CampusError, CampusErrorKind, CampusResult, ConfigError,
    DatabaseError, DatabaseErrorKind, ServerError, ServerErrorKind, StorageError,
    StorageErrorKind,
};

// Re-export storage
pub use campusconnect_storage::{
    BlobId, ChunkedBlob, ChunkedBlobStore, FileSystemChunkedStore, FileSystemInlineStore,
    InlineBlob, InlineBlobStore, MediaReference, MediaStore, MediaUpload, MediaUploadBuilder,
    MemoryChunkedStore, MemoryInlineStore, ReleaseReport, StorageHint, StorageKind, StoredMedia,
    TierPolicy, UploadCategory, UploadLimits, read_bounded, sanitize_filename,
};

// Re-export database backends
pub use campusconnect_database::{
    DbPool, PostgresChunkedStore, PostgresInlineStore, create_pool, run_migrations,
};

// Re-export server
pub use campusconnect_server::{
    AppConfig, AppState, BackendKind, GovernorThrottle, UploadThrottle, build_media_store,
    migrate, router, serve,
};
