//! Reactive holder of the current book.
//!
//! [`BookStore`] owns the latest [`BookConfig`], the reader's [`Navigation`]
//! and the [`BookModel`] derived from both. Every change recompiles the model
//! and swaps it in whole, so readers holding an earlier snapshot keep a
//! consistent view.
//!
//! # Thread Safety
//!
//! - `snapshot()` only clones an `Arc` under a read lock
//! - updates are serialized by an internal writer lock
//! - subscribers run after the swap, still under the writer lock, so they see
//!   models in swap order. A subscriber may read the store but must not
//!   update it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::book::BookConfig;
use crate::model::{BookModel, Navigation};

/// Handle returned by [`BookStore::subscribe`].
pub type SubscriptionId = u64;

type Subscriber = Arc<dyn Fn(&Arc<BookModel>) + Send + Sync>;

pub struct BookStore {
    config: RwLock<Arc<BookConfig>>,
    model: RwLock<Arc<BookModel>>,
    navigation: RwLock<Navigation>,
    subscribers: Mutex<BTreeMap<SubscriptionId, Subscriber>>,
    next_id: AtomicU64,
    writer: Mutex<()>,
}

impl BookStore {
    /// Create a store positioned at `/`.
    #[must_use]
    pub fn new(config: BookConfig) -> Self {
        let navigation = Navigation::new("/");
        let model = BookModel::compile(&config, &navigation);
        Self {
            config: RwLock::new(Arc::new(config)),
            model: RwLock::new(Arc::new(model)),
            navigation: RwLock::new(navigation),
            subscribers: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    /// Current model.
    #[must_use]
    pub fn snapshot(&self) -> Arc<BookModel> {
        Arc::clone(&self.model.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Current config.
    #[must_use]
    pub fn config(&self) -> Arc<BookConfig> {
        Arc::clone(&self.config.read().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn navigation(&self) -> Navigation {
        self.navigation
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new config and recompile at the current location.
    pub fn replace_config(&self, config: BookConfig) -> Arc<BookModel> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let model = Arc::new(BookModel::compile(&config, &self.navigation()));
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
        self.swap_model(Arc::clone(&model));
        self.notify(&model);
        model
    }

    /// Produce a new config with `generate` and swap it in.
    ///
    /// # Errors
    ///
    /// Returns the error of `generate`. The previous config and model stay
    /// current and subscribers are not called.
    pub fn refresh<E>(
        &self,
        generate: impl FnOnce() -> Result<BookConfig, E>,
    ) -> Result<Arc<BookModel>, E> {
        let config = generate()?;
        Ok(self.replace_config(config))
    }

    /// Move the reader to a locale-qualified path and recompile.
    pub fn navigate(&self, path: &str) -> Arc<BookModel> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let config = self.config();
        let navigation = Navigation::from_locale_path(path, &config.sidebar.languages());
        let model = Arc::new(BookModel::compile(&config, &navigation));
        *self.navigation.write().unwrap_or_else(PoisonError::into_inner) = navigation;
        self.swap_model(Arc::clone(&model));
        self.notify(&model);
        model
    }

    /// Model for a locale-qualified path, leaving the store untouched.
    #[must_use]
    pub fn model_for(&self, path: &str) -> BookModel {
        let config = self.config();
        let navigation = Navigation::from_locale_path(path, &config.sidebar.languages());
        BookModel::compile(&config, &navigation)
    }

    /// Register a callback run with every new model.
    pub fn subscribe(
        &self,
        callback: impl Fn(&Arc<BookModel>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(callback));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    fn swap_model(&self, model: Arc<BookModel>) {
        *self.model.write().unwrap_or_else(PoisonError::into_inner) = model;
    }

    fn notify(&self, model: &Arc<BookModel>) {
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Arc::clone)
            .collect();
        for subscriber in subscribers {
            subscriber(model);
        }
    }
}
