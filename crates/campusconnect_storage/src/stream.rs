//! Bounded collection of streamed uploads.

use crate::StorageResult;
use campusconnect_error::{StorageError, StorageErrorKind};
use futures::{Stream, StreamExt};

/// Collect a byte stream, failing as soon as it grows past `limit`.
///
/// The payload is never read in full before measuring, so an oversized
/// upload costs at most `limit` bytes of memory plus one chunk.
///
/// # Errors
///
/// - [`StorageErrorKind::PayloadTooLarge`] once the running total exceeds `limit`
/// - Invalid input if the stream itself fails (client abort, malformed body)
///
/// # Examples
///
/// ```
/// use campusconnect_storage::read_bounded;
///
/// # async fn example() {
/// let parts = futures::stream::iter(vec![Ok::<_, std::io::Error>(vec![1u8; 4]), Ok(vec![2u8; 4])]);
/// assert_eq!(read_bounded(parts, 8).await.unwrap().len(), 8);
///
/// let parts = futures::stream::iter(vec![Ok::<_, std::io::Error>(vec![1u8; 4]), Ok(vec![2u8; 5])]);
/// assert!(read_bounded(parts, 8).await.is_err());
/// # }
/// ```
pub async fn read_bounded<S, B, E>(stream: S, limit: u64) -> StorageResult<Vec<u8>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut buffer = Vec::new();

    while let Some(part) = stream.next().await {
        let part = part.map_err(|e| {
            StorageError::invalid_input(format!("upload stream interrupted: {}", e))
        })?;
        let part = part.as_ref();

        let received = buffer.len() as u64 + part.len() as u64;
        if received > limit {
            tracing::debug!(limit, received, "Rejecting oversized upload mid-stream");
            return Err(StorageError::new(StorageErrorKind::PayloadTooLarge {
                limit,
                received,
            }));
        }
        buffer.extend_from_slice(part);
    }

    Ok(buffer)
}
