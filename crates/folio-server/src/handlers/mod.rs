//! HTTP request handlers.

pub(crate) mod config;
pub(crate) mod content;
pub(crate) mod model;
pub(crate) mod theme;

use axum::http::Uri;

use crate::error::ServerError;

/// Fallback for unknown routes.
pub(crate) async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_owned())
}
