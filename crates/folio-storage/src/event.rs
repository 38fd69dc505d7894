//! Storage event types for change notification.
//!
//! Provides types for subscribing to storage changes through the
//! [`Storage::watch`](crate::Storage::watch) method.

use std::path::PathBuf;
use std::sync::mpsc;

/// Kind of storage event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageEventKind {
    /// File or directory was created.
    Created,
    /// File was modified.
    Modified,
    /// File or directory was removed.
    Removed,
}

/// A storage change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEvent {
    /// Path relative to the storage root (e.g., "guide/001-setup.md").
    pub path: PathBuf,
    /// Kind of change.
    pub kind: StorageEventKind,
}

impl StorageEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: StorageEventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Events released together after one quiet period.
pub type ChangeBatch = Vec<StorageEvent>;

/// Receiver for batches of storage events.
///
/// Wraps a [`std::sync::mpsc::Receiver`] for synchronous delivery.
pub struct StorageEventReceiver {
    rx: mpsc::Receiver<ChangeBatch>,
}

impl StorageEventReceiver {
    /// Create a new receiver from a channel receiver.
    pub(crate) fn new(rx: mpsc::Receiver<ChangeBatch>) -> Self {
        Self { rx }
    }

    /// Wait for the next batch (blocking).
    ///
    /// Returns `None` when the sender is dropped.
    #[must_use]
    pub fn recv(&self) -> Option<ChangeBatch> {
        self.rx.recv().ok()
    }

    /// Try to receive a batch without blocking.
    #[must_use]
    pub fn try_recv(&self) -> Option<ChangeBatch> {
        self.rx.try_recv().ok()
    }

    /// Returns a blocking iterator over batches. Stops when the sender is dropped.
    pub fn iter(&self) -> impl Iterator<Item = ChangeBatch> + '_ {
        self.rx.iter()
    }

    /// Create a receiver that never yields events.
    pub(crate) fn no_op() -> Self {
        let (_tx, rx) = mpsc::channel();
        Self { rx }
    }
}

/// Handle to stop watching for changes.
///
/// Dropping the handle stops watching: the watcher thread sees its shutdown
/// channel disconnect and exits.
pub struct WatchHandle {
    _shutdown: Option<mpsc::Sender<()>>,
}

impl WatchHandle {
    pub(crate) fn new(shutdown: mpsc::Sender<()>) -> Self {
        Self {
            _shutdown: Some(shutdown),
        }
    }

    /// Stop watching immediately (consumes the handle).
    pub fn stop(mut self) {
        self._shutdown.take();
    }

    pub(crate) fn no_op() -> Self {
        Self { _shutdown: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_receiver_recv_batch() {
        let (tx, rx) = mpsc::channel();
        let receiver = StorageEventReceiver::new(rx);

        let batch = vec![
            StorageEvent::new("a.md", StorageEventKind::Created),
            StorageEvent::new("b.md", StorageEventKind::Modified),
        ];
        tx.send(batch.clone()).unwrap();

        assert_eq!(receiver.recv(), Some(batch));
    }

    #[test]
    fn test_receiver_recv_on_closed_channel() {
        let (tx, rx) = mpsc::channel::<ChangeBatch>();
        let receiver = StorageEventReceiver::new(rx);
        drop(tx);
        assert!(receiver.recv().is_none());
    }

    #[test]
    fn test_receiver_try_recv_empty() {
        let (_tx, rx) = mpsc::channel::<ChangeBatch>();
        let receiver = StorageEventReceiver::new(rx);
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn test_no_op_receiver_never_yields() {
        let receiver = StorageEventReceiver::no_op();
        assert!(receiver.recv().is_none());
    }

    #[test]
    fn test_watch_handle_stop_disconnects() {
        let (tx, rx) = mpsc::channel::<()>();
        let handle = WatchHandle::new(tx);
        handle.stop();
        assert!(matches!(
            rx.recv_timeout(std::time::Duration::from_millis(10)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        ));
    }
}
