//! Trailing-edge debouncing for storage change notification.
//!
//! Editors emit several events per save and tools touch many files at once.
//! The debouncer folds all of them into one batch that is released only after
//! the tree has been quiet for the debounce duration. Every new event restarts
//! the timer.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::event::StorageEventKind;

/// Where the debouncer is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceState {
    /// Nothing pending.
    Idle,
    /// Events pending, released at `deadline` unless more arrive.
    Scheduled {
        /// Instant at which the pending batch becomes ready.
        deadline: Instant,
    },
}

/// A debounced event with file system path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebouncedEvent {
    /// File system path.
    pub path: PathBuf,
    /// Coalesced kind of change.
    pub kind: StorageEventKind,
}

#[derive(Default)]
struct Pending {
    events: BTreeMap<PathBuf, StorageEventKind>,
    deadline: Option<Instant>,
}

/// Thread-safe trailing-edge event debouncer.
pub struct EventDebouncer {
    pending: Mutex<Pending>,
    debounce_duration: Duration,
}

impl EventDebouncer {
    /// Create a new debouncer with the specified quiet period.
    #[must_use]
    pub fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: Mutex::new(Pending::default()),
            debounce_duration,
        }
    }

    /// Record an event and restart the timer.
    ///
    /// Callable from file system watcher callbacks.
    pub fn record(&self, path: PathBuf, kind: StorageEventKind) {
        use std::collections::btree_map::Entry;

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.deadline = Some(Instant::now() + self.debounce_duration);

        match pending.events.entry(path) {
            Entry::Vacant(entry) => {
                entry.insert(kind);
            }
            Entry::Occupied(mut entry) => {
                if let Some(coalesced) = Self::coalesce(*entry.get(), kind) {
                    *entry.get_mut() = coalesced;
                } else {
                    // Created then removed inside one window: nothing happened
                    entry.remove();
                }
            }
        }
    }

    /// Coalesce two event kinds for the same path.
    ///
    /// Returns `None` if both events cancel out (Created + Removed).
    #[allow(clippy::match_same_arms)]
    fn coalesce(existing: StorageEventKind, new: StorageEventKind) -> Option<StorageEventKind> {
        use StorageEventKind::{Created, Modified, Removed};

        match (existing, new) {
            (Created, Created) => Some(Created),
            (Created, Modified) => Some(Created),
            (Created, Removed) => None,

            (Modified, Created) => Some(Created),
            (Modified, Modified) => Some(Modified),
            (Modified, Removed) => Some(Removed),

            (Removed, Created) => Some(Modified),
            (Removed, Modified) => Some(Removed),
            (Removed, Removed) => Some(Removed),
        }
    }

    /// Current state of the debounce cycle.
    pub fn state(&self) -> DebounceState {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.deadline {
            Some(deadline) => DebounceState::Scheduled { deadline },
            None => DebounceState::Idle,
        }
    }

    /// Release the whole pending batch if the quiet period has elapsed.
    ///
    /// Returns an empty batch while still scheduled. Events are ordered by path.
    pub fn drain_ready(&self) -> Vec<DebouncedEvent> {
        self.drain_at(Instant::now())
    }

    fn drain_at(&self, now: Instant) -> Vec<DebouncedEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.deadline {
            Some(deadline) if deadline <= now => {
                pending.deadline = None;
                std::mem::take(&mut pending.events)
                    .into_iter()
                    .map(|(path, kind)| DebouncedEvent { path, kind })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}
