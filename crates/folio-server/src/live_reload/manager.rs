//! Live reload manager.
//!
//! Consumes debounced change batches from the docs storage and the theme
//! file, rebuilds the book and broadcasts the resulting updates to
//! connected WebSocket clients.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};

use folio_site::{BookCompiler, BookStore, is_dir_config_file, is_markdown_file};
use folio_storage::{
    ChangeBatch, FsStorage, Storage, StorageError, StorageEvent, StorageEventKind,
    StorageEventReceiver, WatchHandle,
};

use super::event::UpdateEvent;
use crate::theme::ThemeState;

/// Capacity of the update broadcast channel.
pub(crate) const CHANNEL_CAPACITY: usize = 100;

/// Where the reload loop is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReloadState {
    Idle,
    /// A batch is queued for processing.
    Scheduled,
    /// The book is being rebuilt.
    Recomputing,
}

/// Rebuilds the book for a batch of docs changes.
pub(crate) struct Recompiler {
    compiler: BookCompiler,
    store: Arc<BookStore>,
}

/// How a batch affects the book.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchChanges {
    /// The tree may have a different shape.
    structural: bool,
    /// Markdown files whose body may have changed.
    pages: Vec<PathBuf>,
    /// Something other than markdown changed.
    assets: bool,
}

impl BatchChanges {
    fn classify(batch: &[StorageEvent]) -> Self {
        let mut changes = Self::default();
        for event in batch {
            let name = event
                .path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            let markdown = is_markdown_file(&name);
            match event.kind {
                StorageEventKind::Created | StorageEventKind::Removed => {
                    changes.structural = true;
                    // Editors often save through a rename that shows up as a create
                    if markdown && event.kind == StorageEventKind::Created {
                        changes.pages.push(event.path.clone());
                    }
                }
                StorageEventKind::Modified if is_dir_config_file(&name) => {
                    changes.structural = true;
                }
                StorageEventKind::Modified if markdown => changes.pages.push(event.path.clone()),
                StorageEventKind::Modified => changes.assets = true,
            }
        }
        changes
    }
}

impl Recompiler {
    pub(crate) fn new(compiler: BookCompiler, store: Arc<BookStore>) -> Self {
        Self { compiler, store }
    }

    /// Turn `batch` into the updates to broadcast.
    ///
    /// Page edits that leave frontmatter and headings untouched are sent as
    /// content updates without rebuilding the book. Anything else rebuilds;
    /// a failed rebuild keeps the previous book and produces no content or
    /// model update.
    pub(crate) fn process_batch(&self, batch: &[StorageEvent]) -> Vec<UpdateEvent> {
        let start = Instant::now();
        let changes = BatchChanges::classify(batch);
        let mut events = Vec::new();

        if changes.structural {
            events.extend(self.rebuild(&changes.pages));
        } else if !changes.pages.is_empty() {
            match self.body_updates(&changes.pages) {
                Some(updates) => events.extend(updates),
                None => events.extend(self.rebuild(&changes.pages)),
            }
        }

        if changes.assets {
            events.push(UpdateEvent::Reload);
        }

        tracing::info!(
            changes = batch.len(),
            updates = events.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Live reload batch processed"
        );
        events
    }

    /// Content updates for `pages`, or `None` when one of them changed its
    /// metadata and the book has to be rebuilt.
    fn body_updates(&self, pages: &[PathBuf]) -> Option<Vec<UpdateEvent>> {
        let reader = self.compiler.reader();
        let mut events = Vec::with_capacity(pages.len());
        for path in pages {
            match reader.read_markdown(path) {
                Ok(file) if file.metadata_changed => {
                    tracing::debug!(path = %path.display(), "Page metadata changed");
                    return None;
                }
                Ok(file) => events.push(UpdateEvent::Content {
                    path: content_path(path),
                    body: file.body,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Changed page is unreadable");
                }
            }
        }
        Some(events)
    }

    fn rebuild(&self, pages: &[PathBuf]) -> Vec<UpdateEvent> {
        let previous = self.store.config();
        match self.store.refresh(|| self.compiler.generate()) {
            Ok(_) => {
                let current = self.store.config();
                if current.same_structure(&previous) {
                    self.content_events(pages)
                } else {
                    vec![UpdateEvent::model(&current)]
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to rebuild book");
                Vec::new()
            }
        }
    }

    fn content_events(&self, pages: &[PathBuf]) -> Vec<UpdateEvent> {
        pages
            .iter()
            .filter_map(|path| match self.compiler.storage().read(path) {
                Ok(body) => Some(UpdateEvent::Content {
                    path: content_path(path),
                    body,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Changed page is unreadable");
                    None
                }
            })
            .collect()
    }
}

/// Content path of a storage path: `guide/a.md` becomes `/guide/a.md`.
fn content_path(path: &Path) -> String {
    let segments: Vec<_> = path
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Manages file watching and broadcasting updates.
pub(crate) struct LiveReloadManager {
    broadcaster: broadcast::Sender<UpdateEvent>,
    state: Arc<Mutex<ReloadState>>,
    _watches: Vec<WatchHandle>,
}

impl LiveReloadManager {
    /// Start watching the docs storage and, if configured, the theme file.
    ///
    /// # Errors
    ///
    /// Returns an error if a watcher cannot be created.
    pub(crate) fn start(
        storage: &dyn Storage,
        recompiler: Recompiler,
        theme: Arc<ThemeState>,
        debounce: Duration,
        broadcaster: broadcast::Sender<UpdateEvent>,
    ) -> Result<Self, StorageError> {
        let state = Arc::new(Mutex::new(ReloadState::Idle));
        let mut watches = Vec::new();

        let (receiver, handle) = storage.watch(debounce)?;
        watches.push(handle);
        let batches = bridge(receiver, Some(Arc::clone(&state)));
        tokio::spawn(docs_loop(
            batches,
            Arc::new(recompiler),
            Arc::clone(&state),
            broadcaster.clone(),
        ));

        if let Some(path) = theme.path().map(Path::to_path_buf) {
            let (receiver, handle) = watch_theme(&path, debounce)?;
            watches.push(handle);
            tokio::spawn(theme_loop(bridge(receiver, None), theme, broadcaster.clone()));
        }

        Ok(Self {
            broadcaster,
            state,
            _watches: watches,
        })
    }

    /// Get a receiver for updates.
    #[must_use]
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<UpdateEvent> {
        self.broadcaster.subscribe()
    }

    #[must_use]
    pub(crate) fn state(&self) -> ReloadState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn set_state(state: &Mutex<ReloadState>, next: ReloadState) {
    *state.lock().unwrap_or_else(PoisonError::into_inner) = next;
}

/// Forward batches from a blocking storage receiver into an async channel.
fn bridge(
    receiver: StorageEventReceiver,
    state: Option<Arc<Mutex<ReloadState>>>,
) -> mpsc::Receiver<ChangeBatch> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for batch in receiver.iter() {
            if let Some(state) = &state {
                set_state(state, ReloadState::Scheduled);
            }
            if tx.blocking_send(batch).is_err() {
                break;
            }
        }
    });
    rx
}

/// Process docs batches one at a time, so at most one rebuild is in flight.
async fn docs_loop(
    mut batches: mpsc::Receiver<ChangeBatch>,
    recompiler: Arc<Recompiler>,
    state: Arc<Mutex<ReloadState>>,
    broadcaster: broadcast::Sender<UpdateEvent>,
) {
    while let Some(batch) = batches.recv().await {
        set_state(&state, ReloadState::Recomputing);
        let worker = Arc::clone(&recompiler);
        match tokio::task::spawn_blocking(move || worker.process_batch(&batch)).await {
            Ok(events) => {
                for event in events {
                    tracing::debug!(kind = event.kind(), "Broadcasting update");
                    let _ = broadcaster.send(event);
                }
            }
            Err(e) => tracing::error!(error = %e, "Live reload worker failed"),
        }
        finish_recompute(&state);
    }
}

/// Return to `Idle` unless the bridge already scheduled the next batch.
fn finish_recompute(state: &Mutex<ReloadState>) {
    let mut current = state.lock().unwrap_or_else(PoisonError::into_inner);
    if *current == ReloadState::Recomputing {
        *current = ReloadState::Idle;
    }
}

fn watch_theme(
    path: &Path,
    debounce: Duration,
) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    FsStorage::new(dir.to_path_buf())
        .with_watch_patterns(&[name.as_str()])?
        .watch(debounce)
}

async fn theme_loop(
    mut batches: mpsc::Receiver<ChangeBatch>,
    theme: Arc<ThemeState>,
    broadcaster: broadcast::Sender<UpdateEvent>,
) {
    while batches.recv().await.is_some() {
        let worker = Arc::clone(&theme);
        match tokio::task::spawn_blocking(move || worker.reload()).await {
            Ok(Some(theme)) => {
                let _ = broadcaster.send(UpdateEvent::Theme { theme });
            }
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "Theme reload worker failed"),
        }
    }
}
