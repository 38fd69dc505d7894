//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use folio_site::ScanError;
use folio_storage::StorageError;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// No markdown file at the requested path.
    #[error("Content not found: {0}")]
    ContentNotFound(String),

    /// Requested path escapes the docs directory.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// No route for the request.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Initial scan of the docs tree failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::ContentNotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Content not found", "path": path}),
            ),
            Self::NotFound(path) => (
                StatusCode::NOT_FOUND,
                json!({"error": "Not found", "path": path}),
            ),
            Self::InvalidPath(path) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid path", "path": path}),
            ),
            Self::Storage(e) if e.is_not_found() => (
                StatusCode::NOT_FOUND,
                json!({"error": e.to_string()}),
            ),
            Self::Storage(_) | Self::Scan(_) | Self::Address(_) | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServerError::ContentNotFound("a.md".to_owned()), StatusCode::NOT_FOUND),
            (ServerError::InvalidPath("../x".to_owned()), StatusCode::BAD_REQUEST),
            (
                ServerError::Storage(StorageError::not_found("a.md")),
                StatusCode::NOT_FOUND,
            ),
            (
                ServerError::Io(std::io::Error::other("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
