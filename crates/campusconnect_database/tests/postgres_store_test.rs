//! Tests for PostgreSQL storage backends.
//!
//! These require a running PostgreSQL instance reachable through
//! `DATABASE_URL` and are ignored by default:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/campusconnect_test cargo test -p campusconnect_database -- --ignored
//! ```

use campusconnect_database::{
    DbPool, PostgresChunkedStore, PostgresInlineStore, create_pool, database_url_from_env,
    run_migrations_with_pool,
};
use campusconnect_storage::{
    BlobId, ChunkedBlob, ChunkedBlobStore, InlineBlob, InlineBlobStore, MediaStore, MediaUpload,
    StorageHint, StorageKind,
};
use std::sync::Arc;

fn setup() -> DbPool {
    let url = database_url_from_env().unwrap();
    let pool = create_pool(&url, 2).unwrap();
    run_migrations_with_pool(&pool).unwrap();
    pool
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_inline_insert_fetch_remove() {
    let store = PostgresInlineStore::new(setup());

    let id = BlobId::new();
    let blob = InlineBlob::new(id, vec![0xFF, 0xD8, 0xFF], "photo.jpg", "image/jpeg");
    store.insert(blob).await.unwrap();

    assert!(store.contains(id).await.unwrap());
    let fetched = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(fetched.data, vec![0xFF, 0xD8, 0xFF]);
    assert_eq!(fetched.content_type, "image/jpeg");

    assert!(store.remove(id).await.unwrap());
    assert!(!store.remove(id).await.unwrap());
    assert!(store.fetch(id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_chunked_insert_fetch_remove() {
    let store = PostgresChunkedStore::new(setup());

    let id = BlobId::new();
    let data: Vec<u8> = (0..10_000).map(|i| (i % 256) as u8).collect();
    store
        .insert(ChunkedBlob::split(id, &data, "notes.pdf", "application/pdf", 1024))
        .await
        .unwrap();

    let fetched = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(fetched.header.chunk_count, 10);
    assert_eq!(fetched.assemble().unwrap(), data);

    assert!(store.remove(id).await.unwrap());
    assert!(!store.contains(id).await.unwrap());
    assert!(!store.remove(id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_chunked_insert_leaves_original_intact() {
    let store = PostgresChunkedStore::new(setup());

    let id = BlobId::new();
    let blob = ChunkedBlob::split(id, b"first version", "a.txt", "text/plain", 4);
    store.insert(blob).await.unwrap();

    let clash = ChunkedBlob::split(id, b"second", "b.txt", "text/plain", 4);
    assert!(store.insert(clash).await.is_err());

    let fetched = store.fetch(id).await.unwrap().unwrap();
    assert_eq!(fetched.assemble().unwrap(), b"first version");
    store.remove(id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_media_store_over_postgres() {
    let pool = setup();
    let store = MediaStore::new(
        Arc::new(PostgresInlineStore::new(pool.clone())),
        Arc::new(PostgresChunkedStore::new(pool)),
    );

    let image = store
        .store(MediaUpload::new(vec![1u8; 2048], "photo.jpg", "image/jpeg", StorageHint::Image))
        .await
        .unwrap();
    let doc = store
        .store(MediaUpload::new(vec![2u8; 600 * 1024], "notes.pdf", "application/pdf", StorageHint::Document))
        .await
        .unwrap();

    assert_eq!(image.kind, StorageKind::Inline);
    assert_eq!(doc.kind, StorageKind::Chunked);

    let found = store.retrieve_by_id(&doc.id.to_string(), None).await.unwrap();
    assert_eq!(found.data().len(), 600 * 1024);

    let report = store.release([&image, &doc]).await;
    assert_eq!(report.removed, 2);
}
