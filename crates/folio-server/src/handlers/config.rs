//! Book config endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use folio_site::BookConfig;

use crate::state::AppState;

/// Response for GET /api/config.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse<'a> {
    /// Whether the update channel is available.
    live_reload_enabled: bool,
    #[serde(flatten)]
    book: &'a BookConfig,
}

/// Handle GET /api/config.
pub(crate) async fn get_config(State(state): State<Arc<AppState>>) -> Response {
    let book = state.store.config();
    Json(ConfigResponse {
        live_reload_enabled: state.live_reload_enabled(),
        book: &book,
    })
    .into_response()
}
