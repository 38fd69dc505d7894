//! Book model endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use folio_site::BookModel;

use crate::state::AppState;

/// Query of GET /api/model.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ModelQuery {
    /// Locale-qualified path, `/` when absent.
    path: Option<String>,
}

/// Handle GET /api/model?path=/en/guide.
pub(crate) async fn get_model(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelQuery>,
) -> Json<BookModel> {
    let path = query.path.as_deref().unwrap_or("/");
    Json(state.store.model_for(path))
}
