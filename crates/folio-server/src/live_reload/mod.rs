//! Live reload: file watching and update broadcasting.

mod event;
mod manager;
mod websocket;

pub use event::UpdateEvent;
pub(crate) use manager::{CHANNEL_CAPACITY, LiveReloadManager, Recompiler};
pub(crate) use websocket::ws_handler;
