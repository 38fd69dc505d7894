//! Theme endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// Handle GET /api/theme.
pub(crate) async fn get_theme(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(state.theme.current())
}
