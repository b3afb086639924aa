//! Backend construction from configuration.

use crate::{AppConfig, BackendKind, DatabaseSettings};
use campusconnect_database::{
    DbPool, PostgresChunkedStore, PostgresInlineStore, create_pool, run_migrations_with_pool,
};
use campusconnect_error::{CampusResult, ConfigError, DatabaseError, DatabaseErrorKind};
use campusconnect_storage::{
    FileSystemChunkedStore, FileSystemInlineStore, MediaStore, TierPolicy,
};
use std::sync::Arc;

/// Build the media store described by configuration.
///
/// # Errors
///
/// Returns an error if the filesystem root cannot be created or the
/// database pool cannot connect.
#[tracing::instrument(skip(config), fields(backend = %config.storage.backend))]
pub async fn build_media_store(config: &AppConfig) -> CampusResult<MediaStore> {
    let store = match config.storage.backend {
        BackendKind::Memory => MediaStore::in_memory(),
        BackendKind::Filesystem => {
            let root = &config.storage.filesystem_root;
            let inline = FileSystemInlineStore::new(root.join("inline"))?;
            let chunked = FileSystemChunkedStore::new(root.join("chunked"))?;
            MediaStore::new(Arc::new(inline), Arc::new(chunked))
        }
        BackendKind::Postgres => {
            let pool = connect_pool(&config.database).await?;
            MediaStore::new(
                Arc::new(PostgresInlineStore::new(pool.clone())),
                Arc::new(PostgresChunkedStore::new(pool)),
            )
        }
    };

    let store = store
        .with_chunk_size(config.storage.chunk_size)
        .with_policy(TierPolicy {
            inline_max_bytes: config.storage.inline_max_bytes,
        })
        .with_base_url(config.server.public_base_url.as_str());

    tracing::info!(store = ?store, "Media store ready");
    Ok(store)
}

/// Open the PostgreSQL pool named by configuration.
///
/// # Errors
///
/// Returns a configuration error when no URL is available, or a database
/// error when the pool cannot connect.
pub async fn connect_pool(settings: &DatabaseSettings) -> CampusResult<DbPool> {
    let url = settings
        .resolve_url()
        .ok_or_else(|| ConfigError::new("database.url or DATABASE_URL must be set"))?;
    let pool_size = settings.pool_size;

    let pool = tokio::task::spawn_blocking(move || create_pool(&url, pool_size))
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))??;
    Ok(pool)
}

/// Apply pending schema migrations, returning the versions applied.
///
/// # Errors
///
/// Returns an error if the pool cannot connect or a migration fails.
pub async fn migrate(settings: &DatabaseSettings) -> CampusResult<Vec<String>> {
    let pool = connect_pool(settings).await?;

    let applied = tokio::task::spawn_blocking(move || run_migrations_with_pool(&pool))
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))??;
    Ok(applied)
}
