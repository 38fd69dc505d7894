//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading the docs tree from the local filesystem
//! and watching it for changes.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use glob::Pattern;
use notify::{RecursiveMode, Watcher};

use crate::debouncer::EventDebouncer;
use crate::event::{StorageEvent, StorageEventKind, StorageEventReceiver, WatchHandle};
use crate::storage::{Entry, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Longest the watcher thread sleeps between debouncer polls.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Filesystem storage implementation.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use folio_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("docs"));
/// let entries = storage.list(Path::new(""))?;
/// ```
pub struct FsStorage {
    /// Root directory for document storage.
    source_dir: PathBuf,
    /// Patterns restricting which paths produce watch events. Empty means all.
    watch_patterns: Vec<Pattern>,
}

impl FsStorage {
    /// Create a new filesystem storage watching every path under `source_dir`.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self {
            source_dir,
            watch_patterns: Vec::new(),
        }
    }

    /// Restrict watch events to paths matching one of `patterns`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::InvalidPath`] if a pattern is not a valid glob.
    pub fn with_watch_patterns(mut self, patterns: &[&str]) -> Result<Self, StorageError> {
        self.watch_patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    StorageError::new(StorageErrorKind::InvalidPath)
                        .with_path(*p)
                        .with_backend(BACKEND)
                        .with_source(e)
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Validate that a path doesn't escape the source directory.
    ///
    /// Rejects absolute paths and parent directory components (`..`).
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }

    fn full_path(&self, path: &Path) -> Result<PathBuf, StorageError> {
        Self::validate_path(path)?;
        Ok(self.source_dir.join(path))
    }
}

fn watch_error(e: notify::Error) -> StorageError {
    StorageError::new(StorageErrorKind::Watch)
        .with_backend(BACKEND)
        .with_source(e)
}

impl Storage for FsStorage {
    fn list(&self, dir: &Path) -> Result<Vec<Entry>, StorageError> {
        let full_path = self.full_path(dir)?;
        let read_dir = fs::read_dir(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry
                .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))?;
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
                continue;
            };
            // Follow symlinks so a linked docs folder behaves like a real one
            let is_dir = entry.path().is_dir();
            entries.push(if is_dir {
                Entry::dir(name)
            } else {
                Entry::file(name)
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full_path = self.full_path(path)?;
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        self.full_path(path).is_ok_and(|p| p.exists())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.source_dir.join(path)
    }

    fn watch(&self, debounce: Duration) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (event_tx, event_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel();

        let debouncer = Arc::new(EventDebouncer::new(debounce));

        // Watch and strip against the same canonical root; some backends
        // report resolved paths and others the path that was registered
        let watch_root =
            fs::canonicalize(&self.source_dir).unwrap_or_else(|_| self.source_dir.clone());
        let source_dir = watch_root.clone();
        let patterns = self.watch_patterns.clone();
        let debouncer_for_watcher = Arc::clone(&debouncer);
        let source_dir_for_drain = watch_root.clone();

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "File watcher error");
                        return;
                    }
                };
                let kind = match event.kind {
                    notify::EventKind::Create(_) => StorageEventKind::Created,
                    notify::EventKind::Modify(notify::event::ModifyKind::Name(_)) => {
                        // Renames arrive as a pair of paths; the old one is gone
                        // and the new one exists
                        for path in event.paths {
                            let kind = if path.exists() {
                                StorageEventKind::Created
                            } else {
                                StorageEventKind::Removed
                            };
                            record_path(&debouncer_for_watcher, &source_dir, &patterns, path, kind);
                        }
                        return;
                    }
                    notify::EventKind::Modify(_) => StorageEventKind::Modified,
                    notify::EventKind::Remove(_) => StorageEventKind::Removed,
                    _ => return,
                };

                for path in event.paths {
                    record_path(&debouncer_for_watcher, &source_dir, &patterns, path, kind);
                }
            })
            .map_err(watch_error)?;

        watcher
            .watch(&watch_root, RecursiveMode::Recursive)
            .map_err(|e| watch_error(e).with_path(watch_root.clone()))?;

        let watcher = Arc::new(Mutex::new(watcher));

        let poll = POLL_INTERVAL.min(debounce);
        std::thread::spawn(move || {
            let _watcher_guard = watcher;

            loop {
                match shutdown_rx.recv_timeout(poll) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }

                let batch: Vec<StorageEvent> = debouncer
                    .drain_ready()
                    .into_iter()
                    .filter_map(|event| {
                        let rel_path = event.path.strip_prefix(&source_dir_for_drain).ok()?;
                        Some(StorageEvent::new(rel_path, event.kind))
                    })
                    .collect();

                if batch.is_empty() {
                    continue;
                }
                tracing::debug!(events = batch.len(), "Releasing debounced change batch");
                if event_tx.send(batch).is_err() {
                    return;
                }
            }
        });

        Ok((StorageEventReceiver::new(event_rx), WatchHandle::new(shutdown_tx)))
    }
}

fn record_path(
    debouncer: &EventDebouncer,
    source_dir: &Path,
    patterns: &[Pattern],
    path: PathBuf,
    kind: StorageEventKind,
) {
    let Ok(rel_path) = path.strip_prefix(source_dir) else {
        return;
    };
    let matches = patterns.is_empty() || patterns.iter().any(|p| p.matches_path(rel_path));
    if !matches {
        return;
    }
    tracing::debug!(path = %rel_path.display(), ?kind, "Recorded filesystem event");
    debouncer.record(path, kind);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    #[test]
    fn test_list_returns_sorted_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "# B").unwrap();
        fs::write(dir.path().join("a.md"), "# A").unwrap();
        fs::create_dir(dir.path().join("guide")).unwrap();

        let storage = FsStorage::new(dir.path().to_path_buf());
        let entries = storage.list(Path::new("")).unwrap();

        assert_eq!(
            entries,
            vec![Entry::file("a.md"), Entry::file("b.md"), Entry::dir("guide")]
        );
    }

    #[test]
    fn test_read_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("guide")).unwrap();
        fs::write(dir.path().join("guide/setup.md"), "# Setup").unwrap();

        let storage = FsStorage::new(dir.path().to_path_buf());
        assert_eq!(storage.read(Path::new("guide/setup.md")).unwrap(), "# Setup");
        assert!(storage.exists(Path::new("guide")));
        assert!(!storage.exists(Path::new("missing.md")));
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf());
        let err = storage.read(Path::new("nope.md")).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf());

        let err = storage.read(Path::new("../secret.md")).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
        let err = storage.read(Path::new("/etc/passwd")).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
        assert!(!storage.exists(Path::new("../")));
    }

    #[test]
    fn test_resolve_joins_root() {
        let storage = FsStorage::new(PathBuf::from("/srv/docs"));
        assert_eq!(
            storage.resolve(Path::new("guide/a.md")),
            PathBuf::from("/srv/docs/guide/a.md")
        );
    }

    #[test]
    fn test_invalid_watch_pattern() {
        let result = FsStorage::new(PathBuf::from("/srv/docs")).with_watch_patterns(&["[a"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_watch_delivers_batch() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(dir.path().to_path_buf());
        let (rx, handle) = storage.watch(Duration::from_millis(20)).unwrap();

        fs::write(dir.path().join("new.md"), "# New").unwrap();

        let mut seen = Vec::new();
        for _ in 0..100 {
            if let Some(batch) = rx.try_recv() {
                seen.extend(batch);
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        handle.stop();

        assert!(
            seen.iter().any(|e| e.path == Path::new("new.md")),
            "expected an event for new.md, got {seen:?}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_watch_through_symlinked_root() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let storage = FsStorage::new(link);
        let (rx, handle) = storage.watch(Duration::from_millis(20)).unwrap();

        fs::write(real.join("new.md"), "# New").unwrap();

        let mut seen = Vec::new();
        for _ in 0..100 {
            if let Some(batch) = rx.try_recv() {
                seen.extend(batch);
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        handle.stop();

        assert!(
            seen.iter().any(|e| e.path == Path::new("new.md")),
            "expected an event for new.md, got {seen:?}"
        );
    }
}
