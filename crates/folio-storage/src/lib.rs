//! Storage abstraction for the Folio book compiler.
//!
//! This crate provides a [`Storage`] trait for listing and reading the docs
//! tree independently of where it lives. This enables:
//!
//! - **Unit testing** of the scanner without touching the real filesystem
//! - **Change notification** with trailing-edge debouncing for the dev server
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `list()`, `read()`, `exists()` and `watch()` methods
//! - [`FsStorage`] implementation for the local filesystem
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//! - [`EventDebouncer`] folding bursts of events into one [`ChangeBatch`]

mod debouncer;
mod event;
mod fs;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod storage;

pub use debouncer::{DebounceState, DebouncedEvent, EventDebouncer};
pub use event::{ChangeBatch, StorageEvent, StorageEventKind, StorageEventReceiver, WatchHandle};
pub use fs::FsStorage;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockStorage;
pub use storage::{Entry, EntryKind, Storage, StorageError, StorageErrorKind};
