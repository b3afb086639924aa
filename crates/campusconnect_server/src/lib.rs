//! HTTP surface for the CampusConnect media store.
//!
//! Provides layered configuration, backend construction, an upload throttle,
//! and the axum router that exposes upload, download, and delete endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use campusconnect_server::{AppConfig, serve};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! serve(config).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod response;
mod routes;
mod server;
mod state;
mod throttle;

pub use backend::{build_media_store, connect_pool, migrate};
pub use config::{
    AppConfig, BackendKind, DatabaseSettings, LoggingSettings, ServerSettings, StorageSettings,
    ThrottleSettings,
};
pub use response::{ApiError, failure, success};
pub use routes::{ClientKey, router};
pub use server::{serve, shutdown_signal};
pub use state::AppState;
pub use throttle::{GovernorThrottle, UploadThrottle, Unthrottled, throttle_from_settings};
