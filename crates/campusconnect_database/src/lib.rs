//! PostgreSQL backends for CampusConnect media storage.
//!
//! This crate provides the schema, migrations, and connection pooling for
//! persisting both storage tiers in PostgreSQL.
//!
//! # Features
//!
//! - Diesel-based PostgreSQL integration with r2d2 pooling
//! - Inline tier in the `binary_images` table
//! - Chunked tier in `blob_files` and `blob_chunks`, written transactionally
//! - Embedded migrations
//!
//! # Example
//!
//! ```rust,ignore
//! use campusconnect_database::{create_pool, run_migrations_with_pool, PostgresChunkedStore, PostgresInlineStore};
//! use campusconnect_storage::MediaStore;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("postgres://localhost/campusconnect", 10)?;
//! run_migrations_with_pool(&pool)?;
//!
//! let store = MediaStore::new(
//!     Arc::new(PostgresInlineStore::new(pool.clone())),
//!     Arc::new(PostgresChunkedStore::new(pool)),
//! );
//! # Ok(())
//! # }
//! ```

mod chunked_store;
mod connection;
mod inline_store;
mod migrations;
mod models;

// Public modules for external access
pub mod schema;

pub use chunked_store::PostgresChunkedStore;
pub use connection::{DbPool, create_pool, database_url_from_env};
pub use inline_store::PostgresInlineStore;
pub use migrations::{run_migrations, run_migrations_with_pool};
pub use models::{BinaryImageRow, BlobChunkRow, BlobFileRow};

use campusconnect_error::{DatabaseError, StorageError};

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[track_caller]
fn read_error(err: DatabaseError) -> StorageError {
    StorageError::read(err.to_string())
}

#[track_caller]
fn write_error(err: DatabaseError) -> StorageError {
    StorageError::write(err.to_string())
}
