//! PostgreSQL chunked-tier backend.
//!
//! A file is one `blob_files` row plus one `blob_chunks` row per chunk.
//! Writes and deletes run in a single transaction, so a reader never sees a
//! header without its chunks.

use crate::connection::run_blocking;
use crate::models::{BlobChunkRow, BlobFileRow, blob_from_rows};
use crate::schema::{blob_chunks, blob_files};
use crate::{DatabaseResult, DbPool, read_error, write_error};
use async_trait::async_trait;
use campusconnect_error::DatabaseError;
use campusconnect_storage::{BlobId, ChunkedBlob, ChunkedBlobStore, StorageResult};
use diesel::prelude::*;

/// Chunks inserted per statement.
const CHUNK_BATCH: usize = 16;

/// Chunked blobs in the `blob_files` and `blob_chunks` tables.
#[derive(Debug, Clone)]
pub struct PostgresChunkedStore {
    pool: DbPool,
}

impl PostgresChunkedStore {
    /// Create a backend over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChunkedBlobStore for PostgresChunkedStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[tracing::instrument(
        skip(self, blob),
        fields(id = %blob.header.id, size = blob.header.length, chunks = blob.header.chunk_count)
    )]
    async fn insert(&self, blob: ChunkedBlob) -> StorageResult<()> {
        run_blocking(&self.pool, move |conn| {
            let file = BlobFileRow::try_from(&blob.header)?;
            let chunks = blob
                .chunks
                .iter()
                .map(|chunk| BlobChunkRow::from_chunk(file.id, chunk))
                .collect::<DatabaseResult<Vec<_>>>()?;

            conn.transaction::<_, DatabaseError, _>(|conn| {
                diesel::insert_into(blob_files::table)
                    .values(&file)
                    .execute(conn)?;
                for batch in chunks.chunks(CHUNK_BATCH) {
                    diesel::insert_into(blob_chunks::table)
                        .values(batch)
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
        .map_err(write_error)?;

        tracing::debug!("Inserted chunked blob");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn fetch(&self, id: BlobId) -> StorageResult<Option<ChunkedBlob>> {
        let key = *id.as_uuid();

        run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let Some(file) = blob_files::table
                    .find(key)
                    .select(BlobFileRow::as_select())
                    .first(conn)
                    .optional()?
                else {
                    return Ok(None);
                };

                let chunks = BlobChunkRow::belonging_to(&file)
                    .select(BlobChunkRow::as_select())
                    .order(blob_chunks::n.asc())
                    .load(conn)?;

                blob_from_rows(file, chunks).map(Some)
            })
        })
        .await
        .map_err(read_error)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn remove(&self, id: BlobId) -> StorageResult<bool> {
        let key = *id.as_uuid();

        let deleted = run_blocking(&self.pool, move |conn| {
            conn.transaction::<_, DatabaseError, _>(|conn| {
                diesel::delete(blob_chunks::table.filter(blob_chunks::file_id.eq(key)))
                    .execute(conn)?;
                let files = diesel::delete(blob_files::table.find(key)).execute(conn)?;
                Ok(files)
            })
        })
        .await
        .map_err(write_error)?;

        Ok(deleted > 0)
    }

    async fn contains(&self, id: BlobId) -> StorageResult<bool> {
        let key = *id.as_uuid();

        run_blocking(&self.pool, move |conn| {
            diesel::select(diesel::dsl::exists(blob_files::table.find(key)))
                .get_result::<bool>(conn)
                .map_err(Into::into)
        })
        .await
        .map_err(read_error)
    }
}
