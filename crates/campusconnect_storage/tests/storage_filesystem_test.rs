//! Tests for the filesystem blob backends.

use campusconnect_storage::{
    BlobId, ChunkedBlob, ChunkedBlobStore, FileSystemChunkedStore, FileSystemInlineStore,
    InlineBlob, InlineBlobStore, MediaStore, MediaUpload, MemoryInlineStore, StorageErrorKind,
    StorageHint, StorageKind,
};
use std::sync::Arc;
use tempfile::TempDir;

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

#[tokio::test]
async fn test_insert_and_fetch() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemChunkedStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    let data = sample(1000);
    let blob = ChunkedBlob::split(id, &data, "lab.pdf", "application/pdf", 256);

    storage.insert(blob).await.unwrap();
    assert!(storage.contains(id).await.unwrap());

    let fetched = storage.fetch(id).await.unwrap().unwrap();
    assert_eq!(fetched.header.chunk_count, 4);
    assert_eq!(fetched.header.filename, "lab.pdf");
    assert_eq!(fetched.assemble().unwrap(), data);
}

#[tokio::test]
async fn test_sharded_layout() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemChunkedStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    let blob = ChunkedBlob::split(id, &sample(10), "a.txt", "text/plain", 4);
    storage.insert(blob).await.unwrap();

    let dir = temp_dir.path().join(id.shard()).join(id.to_string());
    assert!(dir.join("manifest.json").exists());
    assert!(dir.join("000000.chunk").exists());
    assert!(dir.join("000002.chunk").exists());
    assert!(!dir.join("000003.chunk").exists());

    // No staging directories left behind
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path().join(id.shard()))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_fetch_missing_returns_none() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemChunkedStore::new(temp_dir.path()).unwrap();

    assert!(storage.fetch(BlobId::new()).await.unwrap().is_none());
    assert!(!storage.contains(BlobId::new()).await.unwrap());
}

#[tokio::test]
async fn test_remove_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemChunkedStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    storage
        .insert(ChunkedBlob::split(id, &sample(64), "a.bin", "application/octet-stream", 16))
        .await
        .unwrap();

    assert!(storage.remove(id).await.unwrap());
    assert!(!storage.remove(id).await.unwrap());
    assert!(storage.fetch(id).await.unwrap().is_none());
    assert!(!temp_dir.path().join(id.shard()).join(id.to_string()).exists());
}

#[tokio::test]
async fn test_duplicate_insert_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemChunkedStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    let blob = ChunkedBlob::split(id, &sample(8), "a.bin", "application/octet-stream", 4);
    storage.insert(blob.clone()).await.unwrap();

    let err = storage.insert(blob).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageWrite(_)));
}

#[tokio::test]
async fn test_tampered_chunk_is_detected() {
    let temp_dir = TempDir::new().unwrap();
    let chunked = FileSystemChunkedStore::new(temp_dir.path()).unwrap();
    let store = MediaStore::new(Arc::new(MemoryInlineStore::new()), Arc::new(chunked))
        .with_chunk_size(100);

    let reference = store
        .store(MediaUpload::new(sample(300), "slides.pptx", "", StorageHint::Document))
        .await
        .unwrap();

    let chunk = temp_dir
        .path()
        .join(reference.id.shard())
        .join(reference.id.to_string())
        .join("000001.chunk");
    let mut bytes = std::fs::read(&chunk).unwrap();
    bytes[0] = bytes[0].wrapping_add(1);
    std::fs::write(&chunk, bytes).unwrap();

    let err = store.retrieve(&reference).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageRead(_)));
}

#[tokio::test]
async fn test_missing_chunk_is_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemChunkedStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    storage
        .insert(ChunkedBlob::split(id, &sample(30), "a.bin", "application/octet-stream", 10))
        .await
        .unwrap();

    let chunk = temp_dir
        .path()
        .join(id.shard())
        .join(id.to_string())
        .join("000002.chunk");
    std::fs::remove_file(chunk).unwrap();

    let err = storage.fetch(id).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageRead(_)));
}

#[tokio::test]
async fn test_media_store_over_filesystem() {
    let temp_dir = TempDir::new().unwrap();
    let chunked = FileSystemChunkedStore::new(temp_dir.path().join("blobs")).unwrap();
    let store = MediaStore::new(Arc::new(MemoryInlineStore::new()), Arc::new(chunked));

    let data = sample(600 * 1024);
    let reference = store
        .store(MediaUpload::new(data.clone(), "dataset.zip", "application/zip", StorageHint::Document))
        .await
        .unwrap();
    assert_eq!(reference.kind, StorageKind::Chunked);

    let media = store
        .retrieve_by_id(&reference.id.to_string(), None)
        .await
        .unwrap();
    assert_eq!(media.data(), &data);
    assert_eq!(media.content_type(), "application/zip");

    assert!(store.delete(&reference).await.unwrap());
    assert!(store.retrieve(&reference).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_empty_payload_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemChunkedStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    storage
        .insert(ChunkedBlob::split(id, b"", "empty.txt", "text/plain", 16))
        .await
        .unwrap();

    let fetched = storage.fetch(id).await.unwrap().unwrap();
    assert_eq!(fetched.header.chunk_count, 0);
    assert!(fetched.assemble().unwrap().is_empty());
}

#[tokio::test]
async fn test_inline_insert_fetch_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let id = BlobId::new();
    let data = sample(2048);

    {
        let storage = FileSystemInlineStore::new(temp_dir.path()).unwrap();
        storage
            .insert(InlineBlob::new(id, data.clone(), "avatar.png", "image/png"))
            .await
            .unwrap();
    }

    let storage = FileSystemInlineStore::new(temp_dir.path()).unwrap();
    assert!(storage.contains(id).await.unwrap());

    let fetched = storage.fetch(id).await.unwrap().unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.data, data);
    assert_eq!(fetched.filename, "avatar.png");
    assert_eq!(fetched.content_type, "image/png");

    let dir = temp_dir.path().join(id.shard()).join(id.to_string());
    assert!(dir.join("manifest.json").exists());
    assert!(dir.join("data.bin").exists());
}

#[tokio::test]
async fn test_inline_remove_and_duplicates() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemInlineStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    let blob = InlineBlob::new(id, sample(16), "a.gif", "image/gif");
    storage.insert(blob.clone()).await.unwrap();

    let err = storage.insert(blob).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageWrite(_)));

    assert!(storage.remove(id).await.unwrap());
    assert!(!storage.remove(id).await.unwrap());
    assert!(storage.fetch(id).await.unwrap().is_none());
    assert!(!storage.contains(id).await.unwrap());
}

#[tokio::test]
async fn test_inline_truncated_data_is_read_error() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemInlineStore::new(temp_dir.path()).unwrap();

    let id = BlobId::new();
    storage
        .insert(InlineBlob::new(id, sample(64), "a.webp", "image/webp"))
        .await
        .unwrap();

    let data = temp_dir
        .path()
        .join(id.shard())
        .join(id.to_string())
        .join("data.bin");
    std::fs::write(&data, b"short").unwrap();

    let err = storage.fetch(id).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageRead(_)));
}

#[tokio::test]
async fn test_contains_reports_io_failure() {
    let temp_dir = TempDir::new().unwrap();
    let chunked = FileSystemChunkedStore::new(temp_dir.path().join("chunked")).unwrap();
    let inline = FileSystemInlineStore::new(temp_dir.path().join("inline")).unwrap();

    // A plain file where the shard directory should be
    let id = BlobId::new();
    std::fs::write(temp_dir.path().join("chunked").join(id.shard()), b"").unwrap();
    std::fs::write(temp_dir.path().join("inline").join(id.shard()), b"").unwrap();

    let err = chunked.contains(id).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageRead(_)));
    let err = inline.contains(id).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageRead(_)));
}
