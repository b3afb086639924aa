//! Embedded schema migrations.

use crate::{DatabaseResult, DbPool};
use campusconnect_error::{DatabaseError, DatabaseErrorKind};
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run pending migrations, returning the versions applied.
///
/// # Errors
///
/// Returns a migration error if any migration fails.
#[tracing::instrument(skip(conn))]
pub fn run_migrations(conn: &mut PgConnection) -> DatabaseResult<Vec<String>> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();

    if applied.is_empty() {
        tracing::info!("Database schema is up to date");
    } else {
        tracing::info!(count = applied.len(), versions = ?applied, "Applied migrations");
    }
    Ok(applied)
}

/// Run pending migrations on a pooled connection.
///
/// # Errors
///
/// Returns a connection error if checkout fails, or a migration error.
pub fn run_migrations_with_pool(pool: &DbPool) -> DatabaseResult<Vec<String>> {
    let mut conn = pool.get()?;
    run_migrations(&mut conn)
}
