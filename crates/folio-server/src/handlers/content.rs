//! Raw page content endpoint.
//!
//! Serves page markdown as stored in the docs directory. In i18n mode an
//! untranslated page is completed from the fallback language.

use std::path::{Component, Path as FsPath};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use md5::{Digest, Md5};

use folio_site::{ContentSource, is_markdown_file, split_locale_path};

use crate::error::ServerError;
use crate::state::AppState;

/// Header naming the language a translated page was completed from.
const TRANSLATED_FROM: &str = "x-translated-from";

/// Handle GET /_content/{*path}.
pub(crate) async fn get_content(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let relative = validate_path(&path)?;
    if !is_markdown_file(&relative) {
        return Err(ServerError::ContentNotFound(path));
    }

    let config = state.store.config();
    let full = format!("/{relative}");
    let (lang, origin_link) = split_locale_path(&full, &config.sidebar.languages());
    let source = ContentSource {
        lang: lang.unwrap_or_default().to_owned(),
        origin_link,
        hash: None,
    };
    let content = source
        .load(state.storage.as_ref(), config.fallback_language().as_deref())
        .map_err(|e| {
            if e.is_not_found() {
                ServerError::ContentNotFound(path.clone())
            } else {
                ServerError::Storage(e)
            }
        })?;

    let etag = compute_etag(&state.version, &content.body);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let mut response = (
        [
            (header::ETAG, etag),
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_owned()),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        content.body,
    )
        .into_response();
    if let Some(from) = content.translated_from
        && let Ok(value) = HeaderValue::from_str(&from)
    {
        response.headers_mut().insert(TRANSLATED_FROM, value);
    }
    Ok(response)
}

/// Normalize a request path, rejecting anything that leaves the docs root.
fn validate_path(path: &str) -> Result<String, ServerError> {
    let invalid = || ServerError::InvalidPath(path.to_owned());
    if path.contains('\\') {
        return Err(invalid());
    }
    let mut segments = Vec::new();
    for component in FsPath::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_str().ok_or_else(invalid)?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid());
            }
        }
    }
    if segments.is_empty() {
        return Err(invalid());
    }
    Ok(segments.join("/"))
}

/// Compute `ETag` from version and content.
///
/// MD5 truncated to 64 bits is plenty for cache validation.
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
