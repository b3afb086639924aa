//! JSON envelopes and error-to-status mapping.
//!
//! Success bodies are `{"status": "success", "data": ...}` and error bodies
//! are `{"status": "error", "message": ...}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use campusconnect_error::{StorageError, StorageErrorKind};
use serde::Serialize;
use serde_json::json;

const MIB: u64 = 1024 * 1024;

/// Wrap a payload in the success envelope.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(json!({ "status": "success", "data": data }))).into_response()
}

/// Wrap a message in the error envelope.
pub fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let message = message.into();
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

/// Storage error rendered as an HTTP response.
#[derive(Debug, derive_more::From)]
pub struct ApiError(StorageError);

impl ApiError {
    /// The underlying storage error.
    pub fn inner(&self) -> &StorageError {
        &self.0
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            StorageErrorKind::InvalidInput(_) | StorageErrorKind::InvalidReference(_) => {
                StatusCode::BAD_REQUEST
            }
            StorageErrorKind::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            StorageErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            StorageErrorKind::Throttled(_) => StatusCode::TOO_MANY_REQUESTS,
            StorageErrorKind::StorageWrite(_) | StorageErrorKind::StorageRead(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message; backend detail stays in the logs.
    fn message(&self) -> String {
        match self.0.kind() {
            StorageErrorKind::InvalidInput(msg)
            | StorageErrorKind::InvalidReference(msg)
            | StorageErrorKind::Throttled(msg) => msg.clone(),
            StorageErrorKind::PayloadTooLarge { limit, .. } => {
                if limit % MIB == 0 {
                    format!("File too large. Maximum size: {}MB", limit / MIB)
                } else {
                    format!("File too large. Maximum size: {} bytes", limit)
                }
            }
            StorageErrorKind::NotFound(_) => "File not found".to_string(),
            StorageErrorKind::StorageWrite(_) => "Failed to store file".to_string(),
            StorageErrorKind::StorageRead(_) => "Failed to read file".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Media request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "Media request rejected");
        }
        failure(status, self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_statuses() {
        let cases = [
            (StorageError::invalid_input("bad"), StatusCode::BAD_REQUEST),
            (
                StorageError::new(StorageErrorKind::PayloadTooLarge {
                    limit: 10,
                    received: 11,
                }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                StorageError::new(StorageErrorKind::InvalidReference("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                StorageError::new(StorageErrorKind::NotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::new(StorageErrorKind::Throttled("slow down".into())),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (StorageError::write("disk full"), StatusCode::INTERNAL_SERVER_ERROR),
            (StorageError::read("corrupt"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn hides_backend_detail() {
        let err = ApiError::from(StorageError::write("connection refused at 10.1.2.3"));
        assert_eq!(err.message(), "Failed to store file");
    }

    #[test]
    fn reports_limit_in_megabytes() {
        let err = ApiError::from(StorageError::new(StorageErrorKind::PayloadTooLarge {
            limit: 25 * MIB,
            received: 26 * MIB,
        }));
        assert_eq!(err.message(), "File too large. Maximum size: 25MB");
    }
}
