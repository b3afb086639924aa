//! Tests for the tier-dispatching media store.

use campusconnect_storage::{
    BlobId, ChunkedBlob, ChunkedBlobStore, InlineBlob, InlineBlobStore, MediaReference,
    MediaStore, MediaUpload, MediaUploadBuilder, MemoryChunkedStore, MemoryInlineStore,
    StorageError, StorageErrorKind, StorageHint, StorageKind, StorageResult, TierPolicy,
};
use campusconnect_error::BuilderErrorKind;
use std::sync::Arc;

fn jpeg_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.extend((0..len - 4).map(|i| (i % 251) as u8));
    data
}

#[tokio::test]
async fn test_small_jpeg_is_stored_inline() {
    let store = MediaStore::in_memory();
    let data = jpeg_bytes(2 * 1024);

    let upload = MediaUpload::new(data.clone(), "photo.jpg", "image/jpeg", StorageHint::Image);
    let reference = store.store(upload).await.unwrap();

    assert_eq!(reference.kind, StorageKind::Inline);
    assert_eq!(reference.url, format!("/files/image/{}", reference.id));

    let media = store.retrieve(&reference).await.unwrap();
    assert_eq!(media.data(), &data);
    assert_eq!(media.content_type(), "image/jpeg");
    assert_eq!(media.filename(), "photo.jpg");
    assert_eq!(*media.kind(), StorageKind::Inline);
}

#[tokio::test]
async fn test_large_pdf_is_stored_chunked() {
    let store = MediaStore::in_memory();
    let data: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 253) as u8).collect();

    let upload = MediaUpload::new(
        data.clone(),
        "notes.pdf",
        "application/pdf",
        StorageHint::Document,
    );
    let reference = store.store(upload).await.unwrap();

    assert_eq!(reference.kind, StorageKind::Chunked);
    assert_eq!(reference.url, format!("/files/blob/{}", reference.id));

    let media = store.retrieve(&reference).await.unwrap();
    assert_eq!(media.data().len(), data.len());
    assert_eq!(media.data(), &data);
    assert_eq!(media.content_type(), "application/pdf");
    assert_eq!(media.filename(), "notes.pdf");
}

#[tokio::test]
async fn test_non_image_extension_with_image_hint_goes_chunked() {
    let store = MediaStore::in_memory();

    let upload = MediaUpload::new(b"%PDF-1.7".to_vec(), "scan.pdf", "application/pdf", StorageHint::Image);
    let reference = store.store(upload).await.unwrap();

    assert_eq!(reference.kind, StorageKind::Chunked);
    let media = store.retrieve(&reference).await.unwrap();
    assert_eq!(media.data(), b"%PDF-1.7");
}

#[tokio::test]
async fn test_image_above_inline_ceiling_goes_chunked() {
    let store = MediaStore::in_memory().with_policy(TierPolicy {
        inline_max_bytes: 1024,
    });
    let data = jpeg_bytes(4096);

    let upload = MediaUpload::new(data.clone(), "big.png", "image/png", StorageHint::Image);
    let reference = store.store(upload).await.unwrap();

    assert_eq!(reference.kind, StorageKind::Chunked);
    assert_eq!(store.retrieve(&reference).await.unwrap().data(), &data);
}

#[tokio::test]
async fn test_delete_then_retrieve_is_not_found() {
    let store = MediaStore::in_memory();
    let upload = MediaUpload::new(b"lecture".to_vec(), "week1.txt", "text/plain", StorageHint::Document);
    let reference = store.store(upload).await.unwrap();

    assert!(store.exists(&reference).await.unwrap());
    assert!(store.delete(&reference).await.unwrap());
    assert!(!store.exists(&reference).await.unwrap());

    let err = store.retrieve(&reference).await.unwrap_err();
    assert!(err.is_not_found());

    // Second delete is a no-op
    assert!(!store.delete(&reference).await.unwrap());
}

#[tokio::test]
async fn test_delete_never_stored_returns_false() {
    let store = MediaStore::in_memory();

    for kind in [StorageKind::Inline, StorageKind::Chunked] {
        let reference = store.reference_for(BlobId::new(), kind);
        assert!(!store.delete(&reference).await.unwrap());
    }
    assert!(!store.delete_by_id(&BlobId::new().to_string(), None).await.unwrap());
}

#[tokio::test]
async fn test_same_bytes_get_distinct_ids() {
    let store = MediaStore::in_memory();
    let data = jpeg_bytes(512);

    let first = store
        .store(MediaUpload::new(data.clone(), "a.jpg", "image/jpeg", StorageHint::Image))
        .await
        .unwrap();
    let second = store
        .store(MediaUpload::new(data.clone(), "a.jpg", "image/jpeg", StorageHint::Image))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);

    assert!(store.delete(&first).await.unwrap());
    assert_eq!(store.retrieve(&second).await.unwrap().data(), &data);
    assert!(store.retrieve(&first).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_legacy_lookup_probes_both_tiers() {
    let store = MediaStore::in_memory();

    let image = store
        .store(MediaUpload::new(jpeg_bytes(64), "a.gif", "image/gif", StorageHint::Image))
        .await
        .unwrap();
    let doc = store
        .store(MediaUpload::new(b"doc".to_vec(), "a.docx", "", StorageHint::Document))
        .await
        .unwrap();

    let found = store.retrieve_by_id(&image.id.to_string(), None).await.unwrap();
    assert_eq!(*found.kind(), StorageKind::Inline);

    let found = store.retrieve_by_id(&doc.id.to_string(), None).await.unwrap();
    assert_eq!(*found.kind(), StorageKind::Chunked);
    assert_eq!(found.content_type(), "application/octet-stream");

    // A wrong explicit kind does not fall back
    let err = store
        .retrieve_by_id(&doc.id.to_string(), Some(StorageKind::Inline))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert!(store.delete_by_id(&doc.id.to_string(), None).await.unwrap());
    let err = store.retrieve_by_id(&doc.id.to_string(), None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_malformed_id_is_invalid_reference() {
    let store = MediaStore::in_memory();

    let err = store.retrieve_by_id("../etc/passwd", None).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::InvalidReference(_)));

    let err = store.delete_by_id("not-an-id", Some(StorageKind::Chunked)).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::InvalidReference(_)));
}

#[tokio::test]
async fn test_filename_is_sanitized_before_storage() {
    let store = MediaStore::in_memory();

    let reference = store
        .store(MediaUpload::new(
            jpeg_bytes(32),
            "../../avatars/my face.png",
            "image/png",
            StorageHint::Image,
        ))
        .await
        .unwrap();

    let media = store.retrieve(&reference).await.unwrap();
    assert_eq!(media.filename(), "my_face.png");

    let err = store
        .store(MediaUpload::new(b"x".to_vec(), "///", "text/plain", StorageHint::Document))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::InvalidInput(_)));
}

#[tokio::test]
async fn test_base_url_prefixes_reference_urls() {
    let store = MediaStore::in_memory().with_base_url("https://campus.example/api/");
    let reference = store
        .store(MediaUpload::new(jpeg_bytes(16), "a.webp", "image/webp", StorageHint::Image))
        .await
        .unwrap();

    assert_eq!(
        reference.url,
        format!("https://campus.example/api/files/image/{}", reference.id)
    );
}

#[tokio::test]
async fn test_small_chunk_size_round_trips() {
    let chunked = MemoryChunkedStore::new();
    let store = MediaStore::new(Arc::new(MemoryInlineStore::new()), Arc::new(chunked.clone()))
        .with_chunk_size(7);
    let data: Vec<u8> = (0..100u8).collect();

    let reference = store
        .store(MediaUpload::new(data.clone(), "seq.bin", "application/octet-stream", StorageHint::Document))
        .await
        .unwrap();

    let raw = chunked.fetch(reference.id).await.unwrap().unwrap();
    assert_eq!(raw.header.chunk_count, 15);
    assert_eq!(raw.header.length, 100);
    assert_eq!(store.retrieve(&reference).await.unwrap().into_data(), data);
}

#[tokio::test]
async fn test_builder_defaults() {
    let upload = MediaUploadBuilder::default()
        .data(b"hello".to_vec())
        .filename("hello.txt")
        .build()
        .unwrap();

    assert_eq!(upload.content_type(), "application/octet-stream");
    assert_eq!(*upload.hint(), StorageHint::Document);

    let err = MediaUploadBuilder::default()
        .filename("x.txt")
        .build()
        .unwrap_err();
    assert!(matches!(err.kind(), BuilderErrorKind::MissingField(field) if field.contains("data")));
}

#[tokio::test]
async fn test_reference_serializes_kind_tag() {
    let store = MediaStore::in_memory();
    let reference = store
        .store(MediaUpload::new(jpeg_bytes(16), "a.png", "image/png", StorageHint::Image))
        .await
        .unwrap();

    let json = serde_json::to_value(&reference).unwrap();
    assert_eq!(json["kind"], "inline");
    assert_eq!(json["id"], reference.id.to_string());

    let back: MediaReference = serde_json::from_value(json).unwrap();
    assert_eq!(back, reference);
}

/// Backend that fails every call, for exercising error propagation.
struct BrokenBackend;

#[async_trait::async_trait]
impl InlineBlobStore for BrokenBackend {
    fn backend_name(&self) -> &'static str {
        "broken"
    }
    async fn insert(&self, _blob: InlineBlob) -> StorageResult<()> {
        Err(StorageError::write("connection reset"))
    }
    async fn fetch(&self, _id: BlobId) -> StorageResult<Option<InlineBlob>> {
        Err(StorageError::read("connection reset"))
    }
    async fn remove(&self, _id: BlobId) -> StorageResult<bool> {
        Err(StorageError::write("connection reset"))
    }
    async fn contains(&self, _id: BlobId) -> StorageResult<bool> {
        Err(StorageError::read("connection reset"))
    }
}

#[async_trait::async_trait]
impl ChunkedBlobStore for BrokenBackend {
    fn backend_name(&self) -> &'static str {
        "broken"
    }
    async fn insert(&self, _blob: ChunkedBlob) -> StorageResult<()> {
        Err(StorageError::write("quota exceeded"))
    }
    async fn fetch(&self, _id: BlobId) -> StorageResult<Option<ChunkedBlob>> {
        Err(StorageError::read("quota exceeded"))
    }
    async fn remove(&self, _id: BlobId) -> StorageResult<bool> {
        Err(StorageError::write("quota exceeded"))
    }
    async fn contains(&self, _id: BlobId) -> StorageResult<bool> {
        Err(StorageError::read("quota exceeded"))
    }
}

#[tokio::test]
async fn test_backend_failures_propagate() {
    let store = MediaStore::new(Arc::new(BrokenBackend), Arc::new(BrokenBackend));

    let err = store
        .store(MediaUpload::new(jpeg_bytes(16), "a.png", "image/png", StorageHint::Image))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageWrite(_)));

    let err = store
        .store(MediaUpload::new(b"doc".to_vec(), "a.pdf", "application/pdf", StorageHint::Document))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageWrite(_)));

    let reference = store.reference_for(BlobId::new(), StorageKind::Chunked);
    let err = store.retrieve(&reference).await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::StorageRead(_)));
}

#[tokio::test]
async fn test_release_counts_outcomes_without_failing() {
    let store = MediaStore::in_memory();
    let kept = store
        .store(MediaUpload::new(jpeg_bytes(16), "a.png", "image/png", StorageHint::Image))
        .await
        .unwrap();
    let attachment = store
        .store(MediaUpload::new(b"doc".to_vec(), "a.pdf", "application/pdf", StorageHint::Document))
        .await
        .unwrap();
    let ghost = store.reference_for(BlobId::new(), StorageKind::Inline);

    let report = store.release([&kept, &attachment, &ghost]).await;
    assert_eq!(report.removed, 2);
    assert_eq!(report.missing, 1);
    assert_eq!(report.failed, 0);

    let broken = MediaStore::new(Arc::new(BrokenBackend), Arc::new(BrokenBackend));
    let report = broken.release([&kept, &attachment]).await;
    assert_eq!(report.failed, 2);
}
