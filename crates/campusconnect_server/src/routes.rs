//! HTTP handlers for upload, download, and delete.

use crate::response::{ApiError, success};
use crate::{AppState, ServerSettings};
use axum::extract::{DefaultBodyLimit, FromRequestParts, Multipart, Path, Query, State};
use axum::extract::ConnectInfo;
use axum::http::request::Parts;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Router, async_trait};
use campusconnect_storage::{
    DEFAULT_CONTENT_TYPE, MediaReference, MediaUpload, StorageError, StorageKind, StoredMedia,
    UploadCategory, read_bounded,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Slack above the largest upload bound for multipart framing.
const BODY_LIMIT_SLACK: u64 = 1024 * 1024;

/// Client identity used as the throttle key.
///
/// The peer IP, or the first `X-Forwarded-For` hop when the state trusts
/// that header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

#[async_trait]
impl FromRequestParts<AppState> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = if *state.trust_forwarded_for() {
            parts
                .headers
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|hop| hop.trim().to_string())
                .filter(|hop| !hop.is_empty())
        } else {
            None
        };

        let key = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientKey(key))
    }
}

/// Body returned after a successful upload.
#[derive(Debug, Clone, Serialize)]
struct UploadResponse {
    #[serde(flatten)]
    reference: MediaReference,
    category: UploadCategory,
    original_filename: String,
    content_type: String,
    file_size: usize,
}

#[derive(Debug, Default, Deserialize)]
struct DownloadQuery {
    #[serde(default)]
    download: Option<String>,
}

impl DownloadQuery {
    fn as_attachment(&self) -> bool {
        self.download
            .as_deref()
            .is_some_and(|value| value.eq_ignore_ascii_case("true"))
    }
}

/// Build the media router.
///
/// Routes:
/// - `POST /api/files/{category}` multipart upload (field `file`)
/// - `GET /api/files/{kind}/{id}` download, `?download=true` for attachment
/// - `GET /api/files/{id}` legacy download by bare id
/// - `DELETE /api/files/{kind}/{id}`
/// - `GET /health`
pub fn router(state: AppState, settings: &ServerSettings) -> Router {
    let state = state.with_trust_forwarded_for(settings.trust_forwarded_for);
    let body_limit = state
        .limits()
        .largest_bound()
        .saturating_add(BODY_LIMIT_SLACK);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/health", get(health))
        .route("/api/files/:target", get(download_legacy).post(upload))
        .route("/api/files/:kind/:id", get(download).delete(remove))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&settings.cors))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health() -> Response {
    success(
        StatusCode::OK,
        json!({ "name": "campusconnect", "version": env!("CARGO_PKG_VERSION") }),
    )
}

#[tracing::instrument(skip(state, multipart), fields(client = %client.0))]
async fn upload(
    State(state): State<AppState>,
    Path(target): Path<String>,
    client: ClientKey,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let category: UploadCategory = target.parse().map_err(StorageError::invalid_input)?;
    state.throttle().check(&client.0)?;

    let limit = state.limits().max_bytes(category);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StorageError::invalid_input(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_filename = field.file_name().unwrap_or_default().to_string();
        if original_filename.trim().is_empty() {
            return Err(StorageError::invalid_input("No file selected").into());
        }
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        state.limits().check_extension(category, &original_filename)?;

        let data = read_bounded(field, limit).await?;
        let file_size = data.len();

        let upload = MediaUpload::new(
            data,
            original_filename.clone(),
            content_type.clone(),
            category.hint(),
        );
        let reference = state.store().store(upload).await?;

        return Ok(success(
            StatusCode::CREATED,
            UploadResponse {
                reference,
                category,
                original_filename,
                content_type,
                file_size,
            },
        ));
    }

    Err(StorageError::invalid_input("No file provided").into())
}

#[tracing::instrument(skip(state, query))]
async fn download(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let kind = StorageKind::from_segment(&kind)?;
    let media = state.store().retrieve_by_id(&id, Some(kind)).await?;
    Ok(media_response(media, query.as_attachment()))
}

#[tracing::instrument(skip(state, query))]
async fn download_legacy(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let media = state.store().retrieve_by_id(&id, None).await?;
    Ok(media_response(media, query.as_attachment()))
}

#[tracing::instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = StorageKind::from_segment(&kind)?;
    let deleted = state.store().delete_by_id(&id, Some(kind)).await?;
    Ok(success(StatusCode::OK, json!({ "deleted": deleted })))
}

fn media_response(media: StoredMedia, attachment: bool) -> Response {
    let disposition = format!(
        "{}; filename=\"{}\"",
        if attachment { "attachment" } else { "inline" },
        media.filename()
    );
    let disposition =
        HeaderValue::from_str(&disposition).unwrap_or_else(|_| HeaderValue::from_static("inline"));
    let content_type = HeaderValue::from_str(media.content_type())
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        media.into_data(),
    )
        .into_response()
}
