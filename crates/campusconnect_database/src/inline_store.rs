//! PostgreSQL inline-tier backend.

use crate::connection::run_blocking;
use crate::models::BinaryImageRow;
use crate::schema::binary_images;
use crate::{DbPool, read_error, write_error};
use async_trait::async_trait;
use campusconnect_storage::{BlobId, InlineBlob, InlineBlobStore, StorageResult};
use diesel::prelude::*;

/// Inline blobs as rows of the `binary_images` table.
#[derive(Debug, Clone)]
pub struct PostgresInlineStore {
    pool: DbPool,
}

impl PostgresInlineStore {
    /// Create a backend over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InlineBlobStore for PostgresInlineStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[tracing::instrument(skip(self, blob), fields(id = %blob.id, size = blob.data.len()))]
    async fn insert(&self, blob: InlineBlob) -> StorageResult<()> {
        let row = BinaryImageRow::from(blob);

        run_blocking(&self.pool, move |conn| {
            diesel::insert_into(binary_images::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
        .map_err(write_error)?;

        tracing::debug!("Inserted inline blob");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn fetch(&self, id: BlobId) -> StorageResult<Option<InlineBlob>> {
        let key = *id.as_uuid();

        let row = run_blocking(&self.pool, move |conn| {
            binary_images::table
                .find(key)
                .select(BinaryImageRow::as_select())
                .first(conn)
                .optional()
                .map_err(Into::into)
        })
        .await
        .map_err(read_error)?;

        Ok(row.map(InlineBlob::from))
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn remove(&self, id: BlobId) -> StorageResult<bool> {
        let key = *id.as_uuid();

        let deleted = run_blocking(&self.pool, move |conn| {
            diesel::delete(binary_images::table.find(key))
                .execute(conn)
                .map_err(Into::into)
        })
        .await
        .map_err(write_error)?;

        Ok(deleted > 0)
    }

    async fn contains(&self, id: BlobId) -> StorageResult<bool> {
        let key = *id.as_uuid();

        run_blocking(&self.pool, move |conn| {
            diesel::select(diesel::dsl::exists(binary_images::table.find(key)))
                .get_result::<bool>(conn)
                .map_err(Into::into)
        })
        .await
        .map_err(read_error)
    }
}
