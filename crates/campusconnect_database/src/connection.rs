//! Database connection utilities.

use crate::DatabaseResult;
use campusconnect_error::{DatabaseError, DatabaseErrorKind};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// Pooled PostgreSQL connections shared by the media backends.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Read the connection string from `DATABASE_URL`.
///
/// # Errors
///
/// Returns a connection error if the variable is not set.
pub fn database_url_from_env() -> DatabaseResult<String> {
    std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })
}

/// Build a connection pool and check out one connection to verify it.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
/// * `pool_size` - Maximum number of connections in the pool
///
/// # Errors
///
/// Returns a connection error if the pool cannot be built or the warm-up
/// checkout fails.
#[tracing::instrument(skip(database_url))]
pub fn create_pool(database_url: &str, pool_size: u32) -> DatabaseResult<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(pool_size.max(1))
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })?;

    // Warm up the pool by getting and immediately releasing a connection
    {
        let _conn = pool.get()?;
    }

    tracing::info!(pool_size, "Database connection pool ready");
    Ok(pool)
}

/// Run a blocking database operation on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(pool: &DbPool, op: F) -> DatabaseResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
{
    let pool = pool.clone();

    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        op(&mut conn)
    })
    .await
    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(format!("Task join error: {}", e))))?
}
