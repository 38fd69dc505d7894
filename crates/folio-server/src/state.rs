//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use folio_site::BookStore;
use folio_storage::Storage;

use crate::live_reload::LiveReloadManager;
use crate::theme::ThemeState;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Docs tree, for raw page content.
    pub(crate) storage: Arc<dyn Storage>,
    /// Current book and model.
    pub(crate) store: Arc<BookStore>,
    pub(crate) theme: Arc<ThemeState>,
    /// Live reload manager (if enabled).
    pub(crate) live_reload: Option<LiveReloadManager>,
    /// Application version for cache validation.
    pub(crate) version: String,
}

impl AppState {
    /// Check if live reload is enabled.
    #[must_use]
    pub(crate) fn live_reload_enabled(&self) -> bool {
        self.live_reload.is_some()
    }
}
