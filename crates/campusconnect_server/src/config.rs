//! Layered configuration for the media server.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from campusconnect.toml)
//! - User overrides (~/.config/campusconnect/campusconnect.toml, then ./campusconnect.toml)
//! - An explicit file passed on the command line
//! - `CAMPUSCONNECT__SECTION__KEY` environment variables, highest precedence

use campusconnect_error::ConfigError;
use campusconnect_storage::{DEFAULT_CHUNK_SIZE, DEFAULT_INLINE_MAX_BYTES, UploadLimits};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../campusconnect.toml");

/// Listener and URL settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Prefix for retrieval URLs in media references
    pub public_base_url: String,
    /// Allowed CORS origins; `*` allows any
    pub cors: Vec<String>,
    /// Key clients by the first `X-Forwarded-For` hop instead of the peer
    /// address; enable only behind a proxy that sets the header
    pub trust_forwarded_for: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            public_base_url: "/api".to_string(),
            cors: vec!["*".to_string()],
            trust_forwarded_for: false,
        }
    }
}

impl ServerSettings {
    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which backends hold the two tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Both tiers in process memory
    #[default]
    #[display("memory")]
    Memory,
    /// Both tiers on disk under `storage.filesystem_root`
    #[display("filesystem")]
    Filesystem,
    /// Both tiers in PostgreSQL
    #[display("postgres")]
    Postgres,
}

/// Storage tier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend selection
    pub backend: BackendKind,
    /// Chunk size for new chunked blobs
    pub chunk_size: usize,
    /// Inline ceiling for images
    pub inline_max_bytes: u64,
    /// Root directory for the filesystem backend
    pub filesystem_root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            chunk_size: DEFAULT_CHUNK_SIZE,
            inline_max_bytes: DEFAULT_INLINE_MAX_BYTES,
            filesystem_root: PathBuf::from("./data/blobs"),
        }
    }
}

/// PostgreSQL settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection string; `DATABASE_URL` is used when unset
    pub url: Option<String>,
    /// Maximum pooled connections
    pub pool_size: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 10,
        }
    }
}

impl DatabaseSettings {
    /// Configured URL, falling back to `DATABASE_URL`.
    pub fn resolve_url(&self) -> Option<String> {
        self.url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| std::env::var("DATABASE_URL").ok())
    }
}

/// Per-client upload throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleSettings {
    /// Sustained uploads per minute per client; 0 disables the throttle
    pub uploads_per_minute: u32,
    /// Uploads allowed back to back
    pub burst: u32,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            uploads_per_minute: 30,
            burst: 10,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete server configuration.
///
/// # Example
///
/// ```toml
/// [server]
/// port = 8080
///
/// [storage]
/// backend = "postgres"
///
/// [throttle]
/// uploads_per_minute = 10
/// burst = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings
    pub server: ServerSettings,
    /// Storage settings
    pub storage: StorageSettings,
    /// Upload limits
    pub limits: UploadLimits,
    /// Database settings
    pub database: DatabaseSettings,
    /// Upload throttle
    pub throttle: ThrottleSettings,
    /// Logging
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Load configuration with the standard precedence.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source cannot be parsed or a
    /// value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Load configuration, layering an explicit file over the user files.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the explicit file is missing, a
    /// source cannot be parsed, or a value is invalid.
    #[instrument]
    pub fn load_with(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        debug!("Loading configuration with precedence: env > explicit > current dir > home dir > bundled defaults");

        // Start with bundled defaults
        let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/campusconnect/campusconnect.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional)
        builder = builder.add_source(File::with_name("campusconnect").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CAMPUSCONNECT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        debug!(backend = %config.storage.backend, port = config.server.port, "Configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a TOML string layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error on parse failure or invalid values.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the server misbehave.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.chunk_size == 0 {
            return Err(ConfigError::new("storage.chunk_size must be greater than zero"));
        }
        if self.storage.chunk_size > u32::MAX as usize {
            return Err(ConfigError::new("storage.chunk_size must fit in 32 bits"));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::new("database.pool_size must be greater than zero"));
        }
        if self.limits.max_image_bytes == 0
            || self.limits.max_document_bytes == 0
            || self.limits.max_resource_bytes == 0
        {
            return Err(ConfigError::new("limits byte bounds must be greater than zero"));
        }
        if self.throttle.uploads_per_minute > 0 && self.throttle.burst == 0 {
            return Err(ConfigError::new(
                "throttle.burst must be greater than zero when throttling is enabled",
            ));
        }
        if self.storage.backend == BackendKind::Postgres && self.database.resolve_url().is_none() {
            return Err(ConfigError::new(
                "storage.backend = \"postgres\" requires database.url or DATABASE_URL",
            ));
        }
        Ok(())
    }
}
