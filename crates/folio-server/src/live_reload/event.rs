//! Messages pushed to live reload clients.

use folio_site::BookConfig;
use serde::Serialize;

/// Update sent to connected WebSocket clients.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UpdateEvent {
    /// A page body changed while the book structure stayed the same.
    Content {
        /// Content path of the page, as used in content URLs.
        path: String,
        body: String,
    },
    /// The book structure changed. Clients recompile their view from `model`.
    Model { model: Box<BookConfig> },
    Theme { theme: serde_json::Value },
    /// A non-markdown asset changed.
    Reload,
}

impl UpdateEvent {
    pub(crate) fn model(config: &BookConfig) -> Self {
        Self::Model {
            model: Box::new(config.clone()),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Content { .. } => "content",
            Self::Model { .. } => "model",
            Self::Theme { .. } => "theme",
            Self::Reload => "reload",
        }
    }
}
