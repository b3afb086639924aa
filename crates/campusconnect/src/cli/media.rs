//! Media command handlers.

use super::MediaCommands;
use campusconnect::{
    AppConfig, BackendKind, CampusResult, MediaReference, MediaStore, MediaUpload, StorageError,
    StorageHint, StorageKind, build_media_store,
};
use serde_json::json;
use std::path::Path;

/// Handle media subcommands against the configured backend.
pub async fn handle_media_command(cmd: MediaCommands, config: &AppConfig) -> CampusResult<()> {
    if config.storage.backend == BackendKind::Memory {
        tracing::warn!("Memory backend does not persist between runs; set storage.backend");
    }
    let store = build_media_store(config).await?;

    match cmd {
        MediaCommands::Put {
            path,
            hint,
            content_type,
        } => put(&store, &path, hint, content_type).await.map(|_| ()),
        MediaCommands::Get { kind, id, out } => get(&store, kind, &id, &out).await,
        MediaCommands::Rm { kind, id } => rm(&store, kind, &id).await,
    }
}

/// Store a local file.
#[tracing::instrument(skip(store))]
async fn put(
    store: &MediaStore,
    path: &Path,
    hint: StorageHint,
    content_type: Option<String>,
) -> CampusResult<MediaReference> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        StorageError::invalid_input(format!("failed to read {}: {}", path.display(), e))
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| StorageError::invalid_input(format!("{} has no file name", path.display())))?;
    let content_type = content_type.unwrap_or_else(|| guess_content_type(&filename));

    let size = data.len();
    let reference = store
        .store(MediaUpload::new(data, filename, content_type.clone(), hint))
        .await?;

    println!(
        "{:#}",
        json!({
            "id": reference.id.to_string(),
            "kind": reference.kind.as_str(),
            "url": reference.url,
            "content_type": content_type,
            "file_size": size,
        })
    );
    Ok(reference)
}

/// Retrieve a file to disk.
#[tracing::instrument(skip(store))]
async fn get(store: &MediaStore, kind: StorageKind, id: &str, out: &Path) -> CampusResult<()> {
    let media = store.retrieve_by_id(id, Some(kind)).await?;

    println!(
        "{} ({}, {} bytes) -> {}",
        media.filename(),
        media.content_type(),
        media.data().len(),
        out.display()
    );

    tokio::fs::write(out, media.into_data())
        .await
        .map_err(|e| StorageError::write(format!("failed to write {}: {}", out.display(), e)))?;
    Ok(())
}

/// Delete a file, printing whether anything was removed.
#[tracing::instrument(skip(store))]
async fn rm(store: &MediaStore, kind: StorageKind, id: &str) -> CampusResult<()> {
    let deleted = store.delete_by_id(id, Some(kind)).await?;
    println!("{}", deleted);
    Ok(())
}

/// MIME type guessed from the file extension.
fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_common_types() {
        assert_eq!(guess_content_type("Photo.JPG"), "image/jpeg");
        assert_eq!(guess_content_type("notes.pdf"), "application/pdf");
        assert_eq!(
            guess_content_type("slides.pptx"),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(guess_content_type("README"), "application/octet-stream");
        assert_eq!(guess_content_type("dump.campusbin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn put_get_rm_against_filesystem_backend() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::from_toml_str(&format!(
            "[storage]\nbackend = \"filesystem\"\nfilesystem_root = {:?}\n",
            dir.path().join("blobs").display().to_string()
        ))
        .unwrap();

        let source = dir.path().join("syllabus.txt");
        std::fs::write(&source, b"week 1: ownership").unwrap();
        let photo = dir.path().join("campus.png");
        std::fs::write(&photo, [0x89u8, b'P', b'N', b'G']).unwrap();

        let (document, image) = {
            let store = build_media_store(&config).await.unwrap();
            let document = put(&store, &source, StorageHint::Document, None).await.unwrap();
            let image = put(&store, &photo, StorageHint::Image, None).await.unwrap();
            (document, image)
        };
        assert_eq!(document.kind, StorageKind::Chunked);
        assert_eq!(image.kind, StorageKind::Inline);

        // Each command builds a fresh store, as separate CLI runs do
        let store = build_media_store(&config).await.unwrap();
        let out = dir.path().join("copy.txt");
        get(&store, StorageKind::Chunked, &document.id.to_string(), &out)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"week 1: ownership");

        let out = dir.path().join("copy.png");
        get(&store, StorageKind::Inline, &image.id.to_string(), &out)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), [0x89u8, b'P', b'N', b'G']);

        let store = build_media_store(&config).await.unwrap();
        rm(&store, StorageKind::Chunked, &document.id.to_string())
            .await
            .unwrap();
        assert!(
            get(&store, StorageKind::Chunked, &document.id.to_string(), &out)
                .await
                .is_err()
        );
    }
}
