//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::http::header::HeaderName;
use axum::routing::get;
use folio_site::CONTENT_PREFIX;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::live_reload;
use crate::state::AppState;

/// Content-Security-Policy of API responses. Pages are rendered elsewhere, so
/// nothing here needs scripts or frames.
const CSP: &str = "default-src 'none'; connect-src 'self' ws: wss:; frame-ancestors 'none'";

fn header_layer(name: &'static str, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static(name),
        HeaderValue::from_static(value),
    )
}

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/api/config", get(handlers::config::get_config))
        .route("/api/model", get(handlers::model::get_model))
        .route("/api/theme", get(handlers::theme::get_theme))
        .route(
            &format!("{CONTENT_PREFIX}/{{*path}}"),
            get(handlers::content::get_content),
        );

    if state.live_reload_enabled() {
        router = router.route("/ws/live-reload", get(live_reload::ws_handler));
    }

    router
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(header_layer("content-security-policy", CSP))
                .layer(header_layer("x-content-type-options", "nosniff"))
                .layer(header_layer("access-control-allow-origin", "*")),
        )
        .with_state(state)
}
