//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock, mpsc};
use std::time::Duration;

use crate::event::{ChangeBatch, StorageEventReceiver, WatchHandle};
use crate::storage::{Entry, Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores files in memory. Directories exist implicitly as parents of files.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use folio_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("readme.md", "# Home")
///     .with_file("001-guide/setup.md", "# Setup");
///
/// let entries = storage.list(Path::new("")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, String>>,
    dirs: RwLock<BTreeSet<PathBuf>>,
    event_sender: RwLock<Option<mpsc::Sender<ChangeBatch>>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.write(path, content);
        self
    }

    /// Add an empty directory.
    #[must_use]
    pub fn with_dir(self, path: impl Into<PathBuf>) -> Self {
        self.dirs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into());
        self
    }

    /// Create or replace a file.
    pub fn write(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), content.into());
    }

    /// Remove a file. Returns whether it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
            .is_some()
    }

    /// Deliver a batch to the active watcher, if any.
    pub fn emit(&self, batch: ChangeBatch) {
        let sender = self.event_sender.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(tx) = sender.as_ref() {
            let _ = tx.send(batch);
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        if path.as_os_str().is_empty() {
            return true;
        }
        let explicit = self
            .dirs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path);
        explicit
            || self
                .files
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .keys()
                .any(|file| file.starts_with(path) && file != path)
    }
}

/// First path component of `path` below `dir`, if `path` lives under `dir`.
fn child_name(dir: &Path, path: &Path) -> Option<(String, bool)> {
    let rest = path.strip_prefix(dir).ok()?;
    let mut components = rest.components();
    let Some(Component::Normal(first)) = components.next() else {
        return None;
    };
    let is_leaf = components.next().is_none();
    Some((first.to_string_lossy().into_owned(), is_leaf))
}

impl Storage for MockStorage {
    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        if !self.is_dir(dir) {
            return Err(StorageError::not_found(dir).with_backend(BACKEND));
        }

        let mut entries: BTreeMap<String, Entry> = BTreeMap::new();
        for path in self.files.read().unwrap_or_else(PoisonError::into_inner).keys() {
            if let Some((name, is_leaf)) = child_name(dir, path) {
                let entry = if is_leaf {
                    Entry::file(name.clone())
                } else {
                    Entry::dir(name.clone())
                };
                entries.entry(name).or_insert(entry);
            }
        }
        for path in self.dirs.read().unwrap_or_else(PoisonError::into_inner).iter() {
            if let Some((name, _)) = child_name(dir, path) {
                entries.entry(name.clone()).or_insert_with(|| Entry::dir(name));
            }
        }
        Ok(entries.into_values().collect())
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
            || self.is_dir(path)
    }

    fn watch(&self, _debounce: Duration) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (tx, rx) = mpsc::channel();
        let (shutdown_tx, _shutdown_rx) = mpsc::channel();
        *self
            .event_sender
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(tx);
        Ok((StorageEventReceiver::new(rx), WatchHandle::new(shutdown_tx)))
    }
}
