//! Row types for the media tables.

use crate::DatabaseResult;
use crate::schema::{binary_images, blob_chunks, blob_files};
use campusconnect_error::{DatabaseError, DatabaseErrorKind};
use campusconnect_storage::{BlobChunk, BlobId, ChunkedBlob, ChunkedBlobHeader, InlineBlob};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Database row for binary_images table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = binary_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BinaryImageRow {
    pub id: Uuid,
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<InlineBlob> for BinaryImageRow {
    fn from(blob: InlineBlob) -> Self {
        Self {
            id: *blob.id.as_uuid(),
            size_bytes: blob.data.len() as i64,
            data: blob.data,
            filename: blob.filename,
            content_type: blob.content_type,
            created_at: blob.created_at,
        }
    }
}

impl From<BinaryImageRow> for InlineBlob {
    fn from(row: BinaryImageRow) -> Self {
        InlineBlob {
            id: BlobId::from(row.id),
            data: row.data,
            filename: row.filename,
            content_type: row.content_type,
            created_at: row.created_at,
        }
    }
}

/// Database row for blob_files table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = blob_files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlobFileRow {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub length: i64,
    pub chunk_size: i32,
    pub chunk_count: i32,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
}

/// Database row for blob_chunks table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable, Associations)]
#[diesel(belongs_to(BlobFileRow, foreign_key = file_id))]
#[diesel(table_name = blob_chunks)]
#[diesel(primary_key(file_id, n))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BlobChunkRow {
    pub file_id: Uuid,
    pub n: i32,
    pub data: Vec<u8>,
}

#[track_caller]
fn out_of_range(field: &str, value: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Query(format!(
        "{} out of range: {}",
        field, value
    )))
}

impl TryFrom<&ChunkedBlobHeader> for BlobFileRow {
    type Error = DatabaseError;

    fn try_from(header: &ChunkedBlobHeader) -> DatabaseResult<Self> {
        Ok(Self {
            id: *header.id.as_uuid(),
            filename: header.filename.clone(),
            content_type: header.content_type.clone(),
            length: i64::try_from(header.length).map_err(|_| out_of_range("length", header.length))?,
            chunk_size: i32::try_from(header.chunk_size)
                .map_err(|_| out_of_range("chunk_size", header.chunk_size))?,
            chunk_count: i32::try_from(header.chunk_count)
                .map_err(|_| out_of_range("chunk_count", header.chunk_count))?,
            sha256: header.sha256.clone(),
            created_at: header.created_at,
        })
    }
}

impl TryFrom<BlobFileRow> for ChunkedBlobHeader {
    type Error = DatabaseError;

    fn try_from(row: BlobFileRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: BlobId::from(row.id),
            length: u64::try_from(row.length).map_err(|_| out_of_range("length", row.length))?,
            chunk_size: u32::try_from(row.chunk_size)
                .map_err(|_| out_of_range("chunk_size", row.chunk_size))?,
            chunk_count: u32::try_from(row.chunk_count)
                .map_err(|_| out_of_range("chunk_count", row.chunk_count))?,
            filename: row.filename,
            content_type: row.content_type,
            sha256: row.sha256,
            created_at: row.created_at,
        })
    }
}

impl BlobChunkRow {
    /// Build the row for one chunk of a file.
    pub fn from_chunk(file_id: Uuid, chunk: &BlobChunk) -> DatabaseResult<Self> {
        Ok(Self {
            file_id,
            n: i32::try_from(chunk.n).map_err(|_| out_of_range("n", chunk.n))?,
            data: chunk.data.clone(),
        })
    }

    /// Convert back into a chunk.
    pub fn into_chunk(self) -> DatabaseResult<BlobChunk> {
        Ok(BlobChunk {
            n: u32::try_from(self.n).map_err(|_| out_of_range("n", self.n))?,
            data: self.data,
        })
    }
}

/// Reassemble a chunked blob from its rows, in any order.
///
/// Integrity is checked later by [`ChunkedBlob::assemble`].
pub fn blob_from_rows(file: BlobFileRow, chunks: Vec<BlobChunkRow>) -> DatabaseResult<ChunkedBlob> {
    let header = ChunkedBlobHeader::try_from(file)?;
    let mut chunks = chunks
        .into_iter()
        .map(BlobChunkRow::into_chunk)
        .collect::<DatabaseResult<Vec<_>>>()?;
    chunks.sort_by_key(|chunk| chunk.n);
    Ok(ChunkedBlob { header, chunks })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips_through_row() {
        let blob = ChunkedBlob::split(BlobId::new(), &[1u8; 10], "a.pdf", "application/pdf", 4);
        let row = BlobFileRow::try_from(&blob.header).unwrap();
        assert_eq!(row.chunk_count, 3);

        let header = ChunkedBlobHeader::try_from(row).unwrap();
        assert_eq!(header, blob.header);
    }

    #[test]
    fn negative_length_is_rejected() {
        let row = BlobFileRow {
            id: Uuid::new_v4(),
            filename: "x".to_string(),
            content_type: "text/plain".to_string(),
            length: -1,
            chunk_size: 4,
            chunk_count: 0,
            sha256: String::new(),
            created_at: Utc::now(),
        };
        assert!(ChunkedBlobHeader::try_from(row).is_err());
    }

    #[test]
    fn rows_are_sorted_before_assembly() {
        let id = BlobId::new();
        let blob = ChunkedBlob::split(id, b"abcdefghij", "a.txt", "text/plain", 4);
        let file = BlobFileRow::try_from(&blob.header).unwrap();
        let mut rows = blob
            .chunks
            .iter()
            .map(|c| BlobChunkRow::from_chunk(*id.as_uuid(), c).unwrap())
            .collect::<Vec<_>>();
        rows.reverse();

        let rebuilt = blob_from_rows(file, rows).unwrap();
        assert_eq!(rebuilt.assemble().unwrap(), b"abcdefghij");
    }

    #[test]
    fn inline_row_records_size() {
        let blob = InlineBlob::new(BlobId::new(), vec![0u8; 42], "a.png", "image/png");
        let row = BinaryImageRow::from(blob.clone());
        assert_eq!(row.size_bytes, 42);
        assert_eq!(InlineBlob::from(row), blob);
    }
}
