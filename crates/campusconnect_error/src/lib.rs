//! Error types for the CampusConnect media store.
//!
//! This crate provides the foundation error types used throughout the CampusConnect workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use campusconnect_error::{CampusResult, StorageError, StorageErrorKind};
//!
//! fn fetch_blob() -> CampusResult<Vec<u8>> {
//!     Err(StorageError::new(StorageErrorKind::NotFound("blob 42".to_string())))?
//! }
//!
//! match fetch_blob() {
//!     Ok(bytes) => println!("Got {} bytes", bytes.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod server;
mod storage;

pub use builder::{BuilderError, BuilderErrorKind};
pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{CampusError, CampusErrorKind, CampusResult};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind};
